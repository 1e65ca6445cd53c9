use std::ops::Index;

use rand::Rng;
use tracing::{debug, info};

use crate::config::ConfigError;
use crate::template::{Template, TemplateKind};

/// Ordered, read-only set of templates addressed by selector index.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    entries: Vec<(TemplateKind, Template)>,
    particle_count: usize,
}

impl TemplateCatalog {
    /// Generates every template in `kinds`, in order, with `particle_count`
    /// particles each.
    pub fn generate<R: Rng + ?Sized>(
        kinds: &[TemplateKind],
        particle_count: usize,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        if particle_count == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        if kinds.is_empty() {
            return Err(ConfigError::NoTemplates);
        }
        let entries = kinds
            .iter()
            .map(|&kind| {
                debug!("generating template {kind}");
                (kind, kind.generate(particle_count, &mut *rng))
            })
            .collect();
        info!(
            "template catalog ready: {} templates x {} particles",
            kinds.len(),
            particle_count
        );
        Ok(Self {
            entries,
            particle_count,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    pub fn get(&self, index: usize) -> Option<&Template> {
        self.entries.get(index).map(|(_, t)| t)
    }

    pub fn kind(&self, index: usize) -> Option<TemplateKind> {
        self.entries.get(index).map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TemplateKind, &Template)> {
        self.entries.iter().map(|(k, t)| (*k, t))
    }
}

impl Index<usize> for TemplateCatalog {
    type Output = Template;

    fn index(&self, index: usize) -> &Template {
        &self.entries[index].1
    }
}
