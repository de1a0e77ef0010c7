use crate::schema::{FixedCostItem, Order, RecordSet, StaffKpi, StaffMember, VariableCost};

/// Read-only access to the collections the engine aggregates over.
///
/// Collections are unordered and may mix tenants; the engine scopes them itself.
pub trait RecordStore {
    fn orders(&self) -> &[Order];
    fn variable_costs(&self) -> &[VariableCost];
    fn fixed_costs(&self) -> &[FixedCostItem];
    fn staff(&self) -> &[StaffMember];
    fn staff_kpis(&self) -> &[StaffKpi];
}

impl RecordStore for RecordSet {
    fn orders(&self) -> &[Order] {
        &self.orders
    }

    fn variable_costs(&self) -> &[VariableCost] {
        &self.variable_costs
    }

    fn fixed_costs(&self) -> &[FixedCostItem] {
        &self.fixed_costs
    }

    fn staff(&self) -> &[StaffMember] {
        &self.staff
    }

    fn staff_kpis(&self) -> &[StaffKpi] {
        &self.staff_kpis
    }
}
