//! Turning a finished path into something a person can follow.

use chrono::NaiveDate;

use super::path::{RouteSegment, SegmentPath};
use crate::domain::{ServiceTime, StopId, format_minutes_seconds};

impl SegmentPath {
    /// Copy of this path with a wait segment wherever one segment arrives
    /// before the next departs.
    ///
    /// The final arrival is unchanged.
    pub fn with_waits(&self) -> SegmentPath {
        let mut out: Vec<RouteSegment> = Vec::with_capacity(self.len() * 2);
        for segment in self.iter() {
            if let Some(prev) = out.last() {
                if prev.arrival != segment.departure {
                    let wait =
                        RouteSegment::wait(prev.arrival, segment.departure, prev.arrival_stop.clone());
                    out.push(wait);
                }
            }
            out.push(segment.clone());
        }
        SegmentPath::new(out)
    }

    /// Step-by-step description of the path.
    ///
    /// ```text
    /// Mockingbird Station
    /// Arrival time: 01/20 09:20:00
    ///
    /// Steps:
    /// 09:00:00 Start at Downtown
    ///  - (5m00s) Wait at stop
    /// 09:05:00 Downtown
    ///  - (15m00s) Take Parker Road
    /// 09:20:00 Mockingbird Station
    /// ```
    ///
    /// Times are wall-clock on `service_date`, so trips past midnight show
    /// the next morning's hour.
    pub fn narrate(
        &self,
        service_date: NaiveDate,
        stop_name: impl Fn(&StopId) -> String,
    ) -> Vec<String> {
        let path = self.with_waits();
        let Some(last) = path.last() else {
            return Vec::new();
        };
        let clock = |at: ServiceTime| at.on(service_date).format("%H:%M:%S").to_string();

        let mut lines = vec![
            stop_name(&last.arrival_stop),
            format!(
                "Arrival time: {}",
                last.arrival.on(service_date).format("%m/%d %H:%M:%S")
            ),
            String::new(),
            "Steps:".to_string(),
        ];
        for segment in path.iter() {
            if segment.is_start() {
                lines.push(format!(
                    "{} Start at {}",
                    clock(segment.departure),
                    stop_name(&segment.arrival_stop)
                ));
                continue;
            }
            let action = if segment.is_transit() {
                format!("Take {}", segment.label())
            } else {
                segment.label()
            };
            lines.push(format!(
                " - ({}) {}",
                format_minutes_seconds(segment.duration()),
                action
            ));
            lines.push(format!(
                "{} {}",
                clock(segment.arrival),
                stop_name(&segment.arrival_stop)
            ));
        }
        lines
    }
}
