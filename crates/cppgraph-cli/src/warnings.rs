//! Warnings collected during a run and printed at its end

#[derive(Debug, Default)]
pub struct Warnings {
    entries: Vec<(String, String)>,
}

impl Warnings {
    pub fn push(&mut self, component: impl Into<String>, message: impl Into<String>) {
        self.entries.push((component.into(), message.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn report(&self) {
        if self.is_empty() {
            return;
        }

        eprintln!("{} warning(s):", self.len());
        for (component, message) in &self.entries {
            eprintln!("  {}: {}", component, message);
        }
    }
}
