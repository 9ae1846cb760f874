//! Command-line front end: estimates blood-alcohol concentration from the three inputs
//! and prints the classification.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::Level;

use alcoholemia::{
    AlcoholemiaSystem, DefuzzificationOp, EngineConfig, InferenceError, InputPolicy, Transition, DEFAULT_THRESHOLD,
};

#[derive(Parser)]
#[command(name = "alcoholemia")]
#[command(version)]
#[command(about = "Fuzzy estimate of blood-alcohol concentration (mg/100 mL)", long_about = None)]
struct Cli {
    /// Alcohol ingested, in mL (0-1000)
    #[arg(short, long)]
    alcohol: f64,

    /// Minutes since drinking (0-180)
    #[arg(short, long)]
    tiempo: f64,

    /// Body weight, in kg (40-150)
    #[arg(short, long)]
    peso: f64,

    /// Minimum membership for a band to be reported
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Defuzzification method
    #[arg(long, value_enum, default_value = "centroid")]
    defuzz: Defuzz,

    /// Clamp inputs into their universes instead of evaluating them as given
    #[arg(long)]
    clamp: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Defuzz {
    Centroid,
    Bisector,
    Mom,
    Lom,
    Som,
}

impl From<Defuzz> for DefuzzificationOp {
    fn from(d: Defuzz) -> Self {
        match d {
            Defuzz::Centroid => Self::Centroid,
            Defuzz::Bisector => Self::Bisector,
            Defuzz::Mom => Self::MeanOfMaximum,
            Defuzz::Lom => Self::LargestOfMaximum,
            Defuzz::Som => Self::SmallestOfMaximum,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = EngineConfig::default()
        .with_threshold(cli.threshold)
        .with_defuzzification(cli.defuzz.into())
        .with_input_policy(if cli.clamp {
            InputPolicy::Clamp
        } else {
            InputPolicy::Accept
        });
    let system = AlcoholemiaSystem::new(config).context("failed to build the fuzzy system")?;

    let assessment = match system.infer(cli.alcohol, cli.tiempo, cli.peso) {
        Ok(assessment) => assessment,
        Err(InferenceError::NoDominantClass { value, .. }) => {
            let nearest = system.nearest(value)?;

            println!("Grado de alcoholemia estimado: {value:.2} mg/100 mL de sangre.\n");
            println!("Clasificación: indeterminada (más cercana: {})", nearest.label());

            return Ok(());
        },
        Err(err) => return Err(err).context("inference failed"),
    };

    let classification = assessment.classification();
    let labels: Vec<_> = classification.active().iter().map(|sev| sev.label()).collect();

    println!(
        "Grado de alcoholemia estimado: {:.2} mg/100 mL de sangre.\n",
        assessment.output_mg_100ml()
    );
    println!("Clasificación: {}", labels.join(" y "));

    if !classification.transitions().is_empty() {
        println!();
    }

    for transition in classification.transitions() {
        println!("{}", transition_notice(transition));
    }

    Ok(())
}

fn transition_notice(transition: &Transition) -> String {
    format!(
        "⚠️ Atención: El grado de alcoholemia se encuentra en una zona de transición entre {} y {}.",
        transition.from.label(),
        transition.to.label()
    )
}

#[test]
fn test_transition_notice() {
    use alcoholemia::Severity;

    let transition = Transition {
        from: Severity::Grado0,
        to: Severity::PrimerGrado,
    };

    assert_eq!(
        transition_notice(&transition),
        "⚠️ Atención: El grado de alcoholemia se encuentra en una zona de transición entre Grado 0 y Primer grado."
    );
}
