use std::collections::HashMap;

/// Initial-condition map handed to every solver path.
///
/// Keys follow the calculator's convention: `"y(0)"` for the dependent
/// value, `"dy(0)"` for its first derivative (second-order equations),
/// `"x(0)"` / `"t(0)"` for the starting point of the independent variable.
/// At most one value per symbol; later inserts overwrite.
#[derive(Clone, Debug, Default)]
pub struct InitialConditions {
    values: HashMap<String, f64>,
}

impl InitialConditions {
    pub fn new() -> Self {
        InitialConditions {
            values: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: &str, value: f64) {
        self.values.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Starting point of the independent variable, defaulting to 0.
    pub fn initial_point(&self, indep_var: &str) -> f64 {
        self.get(&format!("{}(0)", indep_var)).unwrap_or(0.0)
    }

    /// Initial value of the dependent function. Exact key first, then a
    /// substring match against the name, skipping derivative keys.
    pub fn value_of(&self, func_name: &str) -> Option<f64> {
        if let Some(v) = self.get(&format!("{}(0)", func_name)) {
            return Some(v);
        }
        let deriv_prefix = format!("d{}", func_name);
        self.values
            .iter()
            .find(|(k, _)| k.contains(func_name) && !k.contains(&deriv_prefix))
            .map(|(_, v)| *v)
    }

    /// Initial value of the first derivative (`"dy(0)"`-style keys).
    pub fn derivative_of(&self, func_name: &str) -> Option<f64> {
        let deriv_prefix = format!("d{}", func_name);
        if let Some(v) = self.get(&format!("{}(0)", deriv_prefix)) {
            return Some(v);
        }
        self.values
            .iter()
            .find(|(k, _)| k.contains(&deriv_prefix))
            .map(|(_, v)| *v)
    }
}

impl<const N: usize> From<[(&str, f64); N]> for InitialConditions {
    fn from(entries: [(&str, f64); N]) -> Self {
        let mut ics = InitialConditions::new();
        for (k, v) in entries {
            ics.insert(k, v);
        }
        ics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_keys() {
        let ics = InitialConditions::from([("y(0)", 2.0), ("dy(0)", -1.0), ("x(0)", 0.5)]);
        assert_eq!(ics.value_of("y"), Some(2.0));
        assert_eq!(ics.derivative_of("y"), Some(-1.0));
        assert_eq!(ics.initial_point("x"), 0.5);
    }

    #[test]
    fn test_initial_point_defaults_to_zero() {
        let ics = InitialConditions::from([("y(0)", 1.0)]);
        assert_eq!(ics.initial_point("x"), 0.0);
    }

    #[test]
    fn test_derivative_key_not_mistaken_for_value() {
        let ics = InitialConditions::from([("dy(0)", 3.0)]);
        assert_eq!(ics.value_of("y"), None);
        assert_eq!(ics.derivative_of("y"), Some(3.0));
    }

    #[test]
    fn test_later_insert_overwrites() {
        let mut ics = InitialConditions::from([("y(0)", 1.0)]);
        ics.insert("y(0)", 4.0);
        assert_eq!(ics.value_of("y"), Some(4.0));
    }
}
