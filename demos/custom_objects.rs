//! Plots a custom type through a registered plugin, then saves the figure.
//!
//! ```sh
//! RUST_LOG=uniplot=debug cargo run --example custom_objects -- web
//! ```

use tracing_subscriber::EnvFilter;
use uniplot::prelude::*;

/// A damped oscillation sampled on a regular grid.
struct Oscillator {
    damping: f64,
    frequencies: Vec<f64>,
    samples: usize,
}

struct OscillatorPlugin;

impl PlotPlugin for OscillatorPlugin {
    fn extract_data(&self, obj: &PlotObject<'_>) -> PlotResult<Vec<PlotData>> {
        let Some(osc) = obj.downcast_ref::<Oscillator>() else {
            return Ok(Vec::new());
        };
        let t: Vec<f64> = (0..osc.samples).map(|i| i as f64 * 0.05).collect();
        Ok(osc
            .frequencies
            .iter()
            .map(|f| {
                let y = t
                    .iter()
                    .map(|t| (-osc.damping * t).exp() * (f * t).sin())
                    .collect();
                PlotData::new(t.clone(), y).with_name(format!("f = {f}"))
            })
            .collect())
    }

    fn update_style(
        &self,
        _kind: PlotKind,
        data_index: usize,
        data_count: usize,
        data_name: Option<&str>,
        _group_name: Option<&str>,
        style: Style,
    ) -> Style {
        let mut style = style.legend_group("oscillator");
        style.name = data_name.map(str::to_string);
        // Fade the higher harmonics.
        style.opacity = 1.0 - 0.5 * data_index as f64 / data_count.max(1) as f64;
        style
    }
}

fn main() -> PlotResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    register_type::<Oscillator>(OscillatorPlugin, false);

    let engine = std::env::args().nth(1);
    let osc = Oscillator {
        damping: 0.3,
        frequencies: vec![1.0, 2.0, 4.0],
        samples: 200,
    };

    let mut fig = uniplot::figure(engine.as_deref())?;
    fig.plot(PlotObject::new(&osc))?
        .scatter(Series::xy(vec![0.0, 5.0, 10.0], vec![0.0, 0.0, 0.0]).name("nodes").color("k"))?
        .title("Damped oscillator")?
        .xlabel("t [s]")?
        .ylabel("amplitude")?
        .grid(true)?
        .legend(true)?;

    let out = std::env::temp_dir().join(match fig.engine_name() {
        "web" => "oscillator.html",
        _ => "oscillator.png",
    });
    fig.save(&out)?;
    println!("saved {}", out.display());
    fig.show()?;
    Ok(())
}
