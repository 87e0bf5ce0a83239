//! Configuration du CLI : registre et tolérance des solveurs

use std::path::Path;

use anyhow::{Context, Result};
use geodetic::{Ellipsoid, ProjectionSystem, Registry, Tolerance};
use tracing::info;

/// Paramètres partagés par toutes les commandes
#[derive(Debug)]
pub struct Settings {
    pub registry: Registry,
    pub tolerance: Tolerance,
}

impl Settings {
    /// Registre embarqué, enrichi d'un fichier JSON optionnel
    pub fn load(
        registry_path: Option<&Path>,
        precision: f64,
        max_iterations: usize,
    ) -> Result<Self> {
        if !precision.is_finite() || precision < 0.0 {
            anyhow::bail!("Invalid precision: {} (expected a finite value >= 0)", precision);
        }
        if max_iterations == 0 {
            anyhow::bail!("Invalid max iterations: must be at least 1");
        }

        let mut registry = Registry::builtin();
        if let Some(path) = registry_path {
            let extra = Registry::load(path)
                .context(format!("Failed to load registry file: {}", path.display()))?;
            info!(
                path = %path.display(),
                ellipsoids = extra.ellipsoids().count(),
                projections = extra.projections().count(),
                "Registre personnalisé chargé"
            );
            registry.merge(extra);
        }

        Ok(Self {
            registry,
            tolerance: Tolerance::new(precision, max_iterations),
        })
    }

    pub fn ellipsoid(&self, name: &str) -> Result<Ellipsoid> {
        let named = self
            .registry
            .ellipsoid(name)
            .context("Use `geodetic list ellipsoids` to see available names")?;
        Ok(named.ellipsoid)
    }

    pub fn projection(&self, name: &str) -> Result<&ProjectionSystem> {
        self.registry
            .projection(name)
            .context("Use `geodetic list projections` to see available names")
    }
}
