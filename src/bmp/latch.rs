/// A write-once record of the first occurrence of a recurring problem.
///
/// `set` keeps only the first value. `take_unreported` hands that value out
/// exactly once, so the warning is surfaced a single time per inspection no
/// matter how often the condition repeats.
#[derive(Debug)]
pub(crate) struct Latch<T> {
    first: Option<T>,
    reported: bool,
}

impl<T> Default for Latch<T> {
    fn default() -> Self {
        Self {
            first: None,
            reported: false,
        }
    }
}

impl<T: Copy> Latch<T> {
    pub fn set(&mut self, value: T) {
        if self.first.is_none() {
            self.first = Some(value);
        }
    }

    pub fn take_unreported(&mut self) -> Option<T> {
        if self.reported {
            return None;
        }
        let v = self.first?;
        self.reported = true;
        Some(v)
    }
}

/// First out-of-range palette index: (index, x, y).
pub(crate) type BadColor = (u8, i64, i64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_and_reports_once() {
        let mut l = Latch::default();
        assert_eq!(l.take_unreported(), None);
        l.set((5u8, 1i64, 2i64));
        l.set((9, 3, 4));
        assert_eq!(l.take_unreported(), Some((5, 1, 2)));
        assert_eq!(l.take_unreported(), None);
        l.set((7, 0, 0));
        assert_eq!(l.take_unreported(), None);
    }
}
