/// Truth assignment returned by a satisfiable solve.
///
/// Covers variables `1..=max_var()`; anything above is unknown.
#[derive(Clone, PartialEq, Eq)]
pub struct Model {
    values: Vec<bool>,
}

impl Model {
    /// `values[i]` is the value of variable `i + 1`.
    pub fn from_values(values: Vec<bool>) -> Self {
        Self { values }
    }

    /// Builds a model from the literals that hold; unmentioned variables
    /// below the highest one are false.
    pub fn from_literals(lits: impl IntoIterator<Item = i32>) -> Self {
        let mut values = Vec::new();
        for lit in lits {
            if lit == 0 {
                continue;
            }
            let idx = lit.unsigned_abs() as usize - 1;
            if idx >= values.len() {
                values.resize(idx + 1, false);
            }
            values[idx] = lit > 0;
        }
        Self { values }
    }

    pub fn max_var(&self) -> u32 {
        self.values.len() as u32
    }

    pub fn value(&self, var: u32) -> Option<bool> {
        if var == 0 {
            return None;
        }
        self.values.get(var as usize - 1).copied()
    }

    /// Whether `lit` holds; unknown variables count as false.
    pub fn satisfies(&self, lit: i32) -> bool {
        match self.value(lit.unsigned_abs()) {
            Some(value) => value == (lit > 0),
            None => false,
        }
    }

    pub fn true_vars(&self) -> impl Iterator<Item = u32> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, &v)| v)
            .map(|(i, _)| i as u32 + 1)
    }
}

impl core::fmt::Debug for Model {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Model")
            .field("max_var", &self.max_var())
            .field("true_vars", &self.true_vars().collect::<Vec<_>>())
            .finish()
    }
}
