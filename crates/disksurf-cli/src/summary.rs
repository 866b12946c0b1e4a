use console::Style;
use disksurf_core::detection::{DetectionConfig, SurfaceDetection};
use disksurf_core::pipeline::config::PipelineConfig;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn print_optional(s: &Styles, label: &str, value: Option<f64>, unit: &str) {
    match value {
        Some(v) => println!(
            "    {:<12}{}",
            s.label.apply_to(label),
            s.value.apply_to(format!("{v}{unit}"))
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to(label),
            s.disabled.apply_to("not set")
        ),
    }
}

fn print_detection_section(s: &Styles, config: &DetectionConfig) {
    println!("  {}", s.header.apply_to("Detection"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Sigma"),
        s.value.apply_to(config.sigma)
    );
    print_optional(s, "PA", config.position_angle, " deg");
    print_optional(s, "Star row", config.star_row, " px");
    println!(
        "    {:<12}{}",
        s.label.apply_to("Policy"),
        s.method.apply_to(config.disambiguation)
    );
    match config.min_separation {
        Some(sep) => println!(
            "    {:<12}{}",
            s.label.apply_to("Separation"),
            s.value.apply_to(format!("{sep} px"))
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Separation"),
            s.method.apply_to("beam")
        ),
    }
    println!();
}

pub fn print_pipeline_summary(config: &PipelineConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Disk Surface Pipeline"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(21)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    if let Some(ref rotated) = config.rotated_output {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Rotated"),
            s.path.apply_to(rotated.display())
        );
    }
    println!();

    let detection = DetectionConfig {
        star_row: config.detection.star_row.or(config.geometry.star_y),
        ..config.detection.clone()
    };
    print_detection_section(&s, &detection);

    let geometry = &config.geometry;
    println!("  {}", s.header.apply_to("Geometry"));
    print_optional(&s, "Inclination", geometry.inclination, " deg");
    print_optional(&s, "Star x", geometry.star_x, " px");
    print_optional(&s, "Star y", geometry.star_y, " px");
    print_optional(&s, "Systemic", geometry.systemic_velocity, " km/s");
    print_optional(&s, "Distance", geometry.distance, " pc");
    println!();

    let dep = &config.deprojection;
    println!("  {}", s.header.apply_to("Deprojection"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Height"),
        s.method.apply_to(dep.height_convention)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Window"),
        s.value.apply_to(format!("{} km/s", dep.systemic_window))
    );
    print_optional(&s, "Max radius", dep.max_radius, "");
    println!(
        "    {:<12}{}",
        s.label.apply_to("Neg. v"),
        if dep.drop_negative_velocity {
            s.method.apply_to("dropped")
        } else {
            s.disabled.apply_to("kept")
        }
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Tb scale"),
        s.method.apply_to(dep.temperature)
    );
    println!();
}

pub fn print_detection_summary(config: &DetectionConfig, detection: &SurfaceDetection) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Surface Detection"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(17)));
    println!();

    print_detection_section(&s, config);

    let d = &detection.diagnostics;
    println!("  {}", s.header.apply_to("Result"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Noise"),
        s.value.apply_to(format!("{:.4e}", detection.noise))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Threshold"),
        s.value.apply_to(format!("{:.4e}", detection.threshold))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Points"),
        s.value.apply_to(d.points)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Channels"),
        s.value.apply_to(format!("{} of {}", d.channels_with_points, d.channels))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Star cut"),
        s.value.apply_to(d.rejected_by_star)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Trend cut"),
        s.value.apply_to(d.pruned_by_trend)
    );
    println!();
}
