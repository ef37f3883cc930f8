use std::{collections::HashMap, ops::Index};

/// An ordered set of named metrics accumulated over one episode
///
/// Keys are declared up front so that [`take`](Report::take) always produces
/// rows in the same order, which plot and CSV consumers rely on.
#[derive(Debug, Clone)]
pub struct Report {
    keys: Vec<&'static str>,
    values: HashMap<&'static str, f64>,
}

impl Report {
    pub fn new(keys: Vec<&'static str>) -> Self {
        let values = keys.iter().map(|&k| (k, 0.0)).collect();
        Self { keys, values }
    }

    /// Declared keys in insertion order
    pub fn keys(&self) -> &[&'static str] {
        &self.keys
    }

    /// Add to a metric, ignoring keys that were never declared
    pub fn add(&mut self, key: &str, amount: f64) {
        if let Some(v) = self.values.get_mut(key) {
            *v += amount;
        }
    }

    /// Take the current row in key order and reset all metrics to zero
    pub fn take(&mut self) -> Vec<f64> {
        self.keys
            .iter()
            .map(|&k| {
                self.values
                    .insert(k, 0.0)
                    .expect("every declared key has a value")
            })
            .collect()
    }
}

impl Index<&str> for Report {
    type Output = f64;

    fn index(&self, key: &str) -> &Self::Output {
        &self.values[key]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_and_resets() {
        let mut report = Report::new(vec!["reward", "steps"]);
        report.add("steps", 1.0);
        report.add("steps", 1.0);
        report.add("reward", -2.5);
        report.add("bogus", 100.0);

        assert_eq!(report["steps"], 2.0, "Steps accumulated");
        assert_eq!(report.take(), vec![-2.5, 2.0], "Row is in key order");
        assert_eq!(report["steps"], 0.0, "Take resets metrics");
    }
}
