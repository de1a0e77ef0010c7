use crate::period::PeriodBounds;
use crate::schema::DatedRecord;
use chrono::FixedOffset;
use log::debug;

/// Keeps the records that fall inside `bounds`.
///
/// Unbounded windows return every record untouched. For bounded windows a
/// record whose date is missing or unparsable is left out rather than failing
/// the whole report. Dates are read on the calendar of `reporting_offset`.
pub fn filter_by_period<'a, R: DatedRecord>(
    records: &'a [R],
    bounds: &PeriodBounds,
    reporting_offset: FixedOffset,
) -> Vec<&'a R> {
    filter_refs_by_period(records.iter(), bounds, reporting_offset)
}

/// Same as [`filter_by_period`] over an iterator of borrowed records, so an
/// already-filtered selection can be narrowed again without cloning.
pub fn filter_refs_by_period<'a, R, I>(
    records: I,
    bounds: &PeriodBounds,
    reporting_offset: FixedOffset,
) -> Vec<&'a R>
where
    R: DatedRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let range = match bounds {
        PeriodBounds::Unbounded => return records.into_iter().collect(),
        PeriodBounds::Bounded(range) => range,
    };

    let mut malformed = 0usize;
    let kept: Vec<&'a R> = records
        .into_iter()
        .filter(|record| match record.recorded_at(reporting_offset) {
            Some(instant) => range.contains(instant),
            None => {
                malformed += 1;
                false
            }
        })
        .collect();

    if malformed > 0 {
        debug!(
            "Excluded {} record(s) with missing or unparsable dates from {} .. {}",
            malformed, range.start, range.end
        );
    }

    kept
}
