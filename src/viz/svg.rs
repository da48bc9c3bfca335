//! Plain SVG rendering of a [`ViolinArtifact`].

use crate::error::Result;
use crate::viz::violin::ViolinArtifact;
use std::fmt::Write as FmtWrite;
use std::path::Path;

const WIDTH: f64 = 720.0;
const ROW_HEIGHT: f64 = 64.0;
const MARGIN_LEFT: f64 = 150.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 24.0;
const MARGIN_BOTTOM: f64 = 48.0;
const N_TICKS: usize = 5;

const VIOLIN_FILL: &str = "#9ecae1";
const VIOLIN_STROKE: &str = "#3182bd";
const BOX_STROKE: &str = "#252525";

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Linear map from the value axis onto horizontal pixels.
struct Scale {
    lo: f64,
    hi: f64,
}

impl Scale {
    fn x(&self, value: f64) -> f64 {
        let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        MARGIN_LEFT + (value - self.lo) / (self.hi - self.lo) * plot_width
    }
}

/// Render violins (one row per parameter) with box, CI bar and zero line.
pub fn render_svg(artifact: &ViolinArtifact) -> Result<String> {
    let n_rows = artifact.parameters.len().max(1);
    let height = MARGIN_TOP + ROW_HEIGHT * n_rows as f64 + MARGIN_BOTTOM;

    let (lo, hi) = artifact.value_range().unwrap_or((-1.0, 1.0));
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    let scale = Scale {
        lo: lo - pad,
        hi: hi + pad,
    };

    let mut svg = String::new();
    // writing to a String cannot fail
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#,
        w = WIDTH,
        h = height
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);

    let plot_bottom = MARGIN_TOP + ROW_HEIGHT * n_rows as f64;
    if scale.lo < 0.0 && scale.hi > 0.0 {
        let x0 = scale.x(0.0);
        let _ = writeln!(
            svg,
            r##"<line x1="{x:.2}" y1="{top}" x2="{x:.2}" y2="{bottom}" stroke="#969696" stroke-dasharray="4 3"/>"##,
            x = x0,
            top = MARGIN_TOP,
            bottom = plot_bottom
        );
    }

    for (i, entry) in artifact.parameters.iter().enumerate() {
        let yc = MARGIN_TOP + (i as f64 + 0.5) * ROW_HEIGHT;
        let half = ROW_HEIGHT * 0.42;
        let max_density = entry.density_y.iter().copied().fold(0.0, f64::max);

        if max_density > 0.0 {
            let upper = entry
                .density_x
                .iter()
                .zip(entry.density_y.iter())
                .map(|(&x, &d)| (scale.x(x), yc - d / max_density * half));
            let lower = entry
                .density_x
                .iter()
                .zip(entry.density_y.iter())
                .rev()
                .map(|(&x, &d)| (scale.x(x), yc + d / max_density * half));
            let points: Vec<String> = upper
                .chain(lower)
                .map(|(x, y)| format!("{:.2},{:.2}", x, y))
                .collect();
            let _ = writeln!(
                svg,
                r#"<polygon points="{}" fill="{}" fill-opacity="0.7" stroke="{}"/>"#,
                points.join(" "),
                VIOLIN_FILL,
                VIOLIN_STROKE
            );
        }

        let b = &entry.box_stats;
        let box_half = ROW_HEIGHT * 0.1;
        let _ = writeln!(
            svg,
            r#"<line x1="{:.2}" y1="{yc:.2}" x2="{:.2}" y2="{yc:.2}" stroke="{s}"/>"#,
            scale.x(b.whisker_low),
            scale.x(b.q1),
            yc = yc,
            s = BOX_STROKE
        );
        let _ = writeln!(
            svg,
            r#"<line x1="{:.2}" y1="{yc:.2}" x2="{:.2}" y2="{yc:.2}" stroke="{s}"/>"#,
            scale.x(b.q3),
            scale.x(b.whisker_high),
            yc = yc,
            s = BOX_STROKE
        );
        let _ = writeln!(
            svg,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="white" stroke="{}"/>"#,
            scale.x(b.q1),
            yc - box_half,
            (scale.x(b.q3) - scale.x(b.q1)).max(0.5),
            box_half * 2.0,
            BOX_STROKE
        );
        let _ = writeln!(
            svg,
            r#"<line x1="{x:.2}" y1="{:.2}" x2="{x:.2}" y2="{:.2}" stroke="{s}" stroke-width="2"/>"#,
            yc - box_half,
            yc + box_half,
            x = scale.x(b.median),
            s = BOX_STROKE
        );
        // credible interval bar under the violin
        let _ = writeln!(
            svg,
            r##"<line x1="{:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="#de2d26" stroke-width="3"/>"##,
            scale.x(entry.ci_low),
            scale.x(entry.ci_high),
            y = yc + half + 2.0
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="end" dominant-baseline="middle">{}</text>"#,
            MARGIN_LEFT - 8.0,
            yc,
            escape(&entry.name)
        );
    }

    // value axis
    let _ = writeln!(
        svg,
        r#"<line x1="{}" y1="{b}" x2="{}" y2="{b}" stroke="black"/>"#,
        MARGIN_LEFT,
        WIDTH - MARGIN_RIGHT,
        b = plot_bottom
    );
    for k in 0..N_TICKS {
        let value = scale.lo + (scale.hi - scale.lo) * k as f64 / (N_TICKS - 1) as f64;
        let x = scale.x(value);
        let _ = writeln!(
            svg,
            r#"<line x1="{x:.2}" y1="{b}" x2="{x:.2}" y2="{:.2}" stroke="black"/>"#,
            plot_bottom + 4.0,
            x = x,
            b = plot_bottom
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle">{:.2}</text>"#,
            x,
            plot_bottom + 18.0,
            value
        );
    }
    let _ = writeln!(
        svg,
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle">{} ({:.0}% CI in red)</text>"#,
        MARGIN_LEFT + (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / 2.0,
        height - 8.0,
        escape(&artifact.meta.value_label),
        artifact.meta.ci * 100.0
    );
    svg.push_str("</svg>\n");
    Ok(svg)
}

/// Write SVG string to a file.
pub fn save_svg(svg: &str, path: &Path) -> Result<()> {
    std::fs::write(path, svg)?;
    Ok(())
}
