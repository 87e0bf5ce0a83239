//! Affichage des résultats : texte lisible ou JSON
//!
//! En mode texte, chaque commande construit un [`Report`] (champs nommés,
//! avertissements, trace d'itérations optionnelle). En mode JSON, le
//! résultat typé de la bibliothèque est sérialisé tel quel.

use anyhow::Result;
use geodetic::angle::format_dms;
use serde::Serialize;

/// Mode de sortie choisi en ligne de commande
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
    pub steps: bool,
}

impl Output {
    pub fn new(json: bool, steps: bool) -> Self {
        Self { json, steps }
    }

    /// Écrit un résultat sur la sortie standard
    pub fn emit<T: Serialize>(&self, report: &Report, data: &T) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(data)?);
        } else {
            print!("{}", report.render(self.steps));
        }
        Ok(())
    }
}

/// Trace d'un solveur itératif
#[derive(Debug, Clone)]
struct Steps {
    label: String,
    estimates: Vec<f64>,
    iterations: usize,
}

/// Rapport texte d'une commande
#[derive(Debug, Clone, Default)]
pub struct Report {
    title: String,
    fields: Vec<(String, String)>,
    warnings: Vec<String>,
    steps: Option<Steps>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    /// Angle en radians, affiché en degrés-minutes-secondes
    pub fn angle(self, name: &str, radians: f64) -> Self {
        self.field(name, format!("{}  ({:.15} rad)", format_dms(radians), radians))
    }

    /// Longueur en mètres, 4 décimales
    pub fn meters(self, name: &str, value: f64) -> Self {
        self.field(name, format!("{:.4} m", value))
    }

    pub fn warning(mut self, warning: Option<impl ToString>) -> Self {
        if let Some(w) = warning {
            self.warnings.push(w.to_string());
        }
        self
    }

    /// Estimations angulaires successives d'un solveur, en radians
    pub fn steps(mut self, label: &str, estimates: &[f64], iterations: usize) -> Self {
        self.steps = Some(Steps {
            label: label.to_string(),
            estimates: estimates.to_vec(),
            iterations,
        });
        self
    }

    /// Rendu texte ; la trace n'apparaît que si `show_steps`
    pub fn render(&self, show_steps: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== {} ===\n", self.title));

        let width = self.fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        for (name, value) in &self.fields {
            out.push_str(&format!("{:<width$} = {}\n", name, value, width = width));
        }

        if let (true, Some(steps)) = (show_steps, &self.steps) {
            out.push_str(&format!(
                "\n--- STEPS ({} iterations) ---\n",
                steps.iterations
            ));
            for (i, estimate) in steps.estimates.iter().enumerate() {
                out.push_str(&format!(
                    "  {}{} = {}  ({:.15})\n",
                    steps.label,
                    i,
                    format_dms(*estimate),
                    estimate
                ));
            }
        }

        for w in &self.warnings {
            out.push_str(&format!("warning: {}\n", w));
        }
        out
    }
}
