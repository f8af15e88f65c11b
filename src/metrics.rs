use crate::probe::LineClass;
use std::cmp::Ordering;
use std::fmt;

/// Running ping statistics of one address for the current session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Statistics {
    pub min: u64,
    pub avg: u64,
    pub max: u64,
    pub fails: u64,
    pub matched: u64,
    pub above: u64,
    pub under: u64,
    pub replies: u64,
}

impl Statistics {
    /// Folds one classified line into the counters. Returns whether
    /// anything changed.
    ///
    /// `avg` is the midpoint of `min` and `max`, recomputed only when one of
    /// the bounds moves; it is not a running mean.
    pub fn record(&mut self, class: LineClass, threshold: u64) -> bool {
        let rtt = match class {
            LineClass::Ignore => return false,
            LineClass::Failure => {
                self.fails += 1;
                return true;
            }
            LineClass::Reply(rtt) => rtt,
        };

        let bounds_moved = if self.replies == 0 {
            self.min = rtt;
            self.max = rtt;
            true
        } else if rtt < self.min {
            self.min = rtt;
            true
        } else if rtt > self.max {
            self.max = rtt;
            true
        } else {
            false
        };
        self.replies += 1;
        if bounds_moved {
            self.avg = self.min.midpoint(self.max);
        }

        match rtt.cmp(&threshold) {
            Ordering::Equal => self.matched += 1,
            Ordering::Greater => self.above += 1,
            Ordering::Less => self.under += 1,
        }
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min  : {}\navg  : {}\nmax  : {}\nfails: {}\nmatch: {}\nabove: {}\nunder: {}\n",
            self.min, self.avg, self.max, self.fails, self.matched, self.above, self.under
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay(samples: &[LineClass], threshold: u64) -> Statistics {
        let mut stats = Statistics::default();
        for sample in samples {
            stats.record(*sample, threshold);
        }
        stats
    }

    #[test]
    fn average_is_midpoint_and_threshold_counts_every_reply() {
        let stats = replay(
            &[LineClass::Reply(10), LineClass::Reply(30), LineClass::Reply(20)],
            20,
        );
        assert_eq!(stats.min, 10);
        assert_eq!(stats.max, 30);
        assert_eq!(stats.avg, 20);
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.above, 1);
        assert_eq!(stats.under, 1);
        assert_eq!(stats.fails, 0);
    }

    #[test]
    fn failure_only_touches_fail_counter() {
        let mut stats = replay(&[LineClass::Reply(15)], 10);
        let before = stats;
        assert!(stats.record(LineClass::Failure, 10));
        assert_eq!(stats.fails, before.fails + 1);
        assert_eq!((stats.min, stats.avg, stats.max), (before.min, before.avg, before.max));
        assert_eq!(stats.above, before.above);
    }

    #[test]
    fn ignored_lines_change_nothing() {
        let mut stats = replay(&[LineClass::Reply(5)], 0);
        let before = stats;
        assert!(!stats.record(LineClass::Ignore, 0));
        assert_eq!(stats, before);
    }

    #[test]
    fn ties_keep_bounds_and_average() {
        let stats = replay(
            &[
                LineClass::Reply(10),
                LineClass::Reply(40),
                LineClass::Reply(40),
                LineClass::Reply(10),
            ],
            100,
        );
        assert_eq!((stats.min, stats.avg, stats.max), (10, 25, 40));
        assert_eq!(stats.under, 4);
    }

    #[test]
    fn zero_millisecond_first_reply_is_a_real_minimum() {
        let stats = replay(&[LineClass::Reply(0), LineClass::Reply(3)], 0);
        assert_eq!((stats.min, stats.max, stats.avg), (0, 3, 1));
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.above, 1);
    }

    #[test]
    fn saturated_reply_keeps_average_between_bounds() {
        let stats = replay(&[LineClass::Reply(10), LineClass::Reply(u64::MAX)], 20);
        assert_eq!(stats.min, 10);
        assert_eq!(stats.max, u64::MAX);
        assert_eq!(stats.avg, 10 + (u64::MAX - 10) / 2);
        assert_eq!((stats.under, stats.above), (1, 1));
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut stats = replay(&[LineClass::Reply(10), LineClass::Failure], 10);
        stats.reset();
        assert_eq!(stats, Statistics::default());
        assert_eq!(
            stats.to_string(),
            "min  : 0\navg  : 0\nmax  : 0\nfails: 0\nmatch: 0\nabove: 0\nunder: 0\n"
        );
    }
}
