/// Demo: Run a synthetic stream of SDK events through the validation pipeline
/// Shows standardization, scoring, readiness evaluation, and the stats accumulator
use event_gate::observability;
use event_gate::pipeline::validation::stages::privacy::sha256_hex;
use event_gate::pipeline::validation::ValidationPipeline;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Value};

fn synthetic_event(rng: &mut impl Rng) -> Value {
    let product = format!("sku-{}", rng.gen_range(100..999));
    let value = rng.gen_range(5.0..250.0_f64);

    let candidates = vec![
        // Clean canonical purchase, hashed identity, consent granted
        json!({
            "event_name": "Purchase",
            "user_id": format!("u{}", rng.gen_range(1..50)),
            "platform": "web",
            "properties": {
                "value": (value * 100.0).round() / 100.0,
                "currency": "USD",
                "content_ids": [product],
                "order_id": format!("o{}", rng.gen_range(1000..9999)),
                "email": sha256_hex("shopper@example.com"),
                "consent_granted": true
            }
        }),
        // Legacy name that gets migrated
        json!({
            "event_name": "page_view",
            "session_id": "s-demo",
            "platform": "web",
            "page_url": "https://shop.example.com/landing",
            "properties": {"consent_granted": true}
        }),
        // Cart event missing its subject: hard error
        json!({
            "event_name": "AddToCart",
            "user_id": "u7",
            "properties": {"value": 49.99, "currency": "USD"}
        }),
        // Lead with raw PII: compliant sites should hash first
        json!({
            "event_name": "Lead",
            "properties": {
                "email": "lead@example.com",
                "lead_source": "newsletter"
            }
        }),
        // Something homegrown the taxonomy does not know
        json!({
            "event_name": "wishlist_sparkle",
            "user_id": "u9",
            "properties": {"consent_granted": "yes"}
        }),
    ];

    candidates
        .choose(rng)
        .cloned()
        .expect("candidate list is non-empty")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_logging();
    let metrics_handle = event_gate::observability::metrics::init()?;

    println!("\n🚦 VALIDATION PIPELINE DEMO: From Raw SDK Event to Verdict");
    println!("{}", "=".repeat(60));
    println!("Stages: structure → standardization → data types");
    println!("        → business rules → ad platform → privacy");
    println!("{}", "=".repeat(60));

    let pipeline = ValidationPipeline::new()
        .with_timing_sink(Box::new(observability::LogTimingSink));
    let mut rng = rand::thread_rng();

    let total = 20;
    for i in 0..total {
        let event = synthetic_event(&mut rng);
        let result = pipeline.validate(&event);

        let marker = if result.is_valid { "✅" } else { "❌" };
        println!(
            "{} [{:02}] {:24} score {:3}  ready {}  compliant {}",
            marker,
            i,
            result.standardized_data.event_name,
            result.quality_score,
            result.metadata.ad_platform_ready,
            result.metadata.privacy_compliant
        );
        for warning in result.warnings.iter().take(2) {
            println!("      ⚠️  {}", warning);
        }
        for err in &result.errors {
            println!("      ⛔ {}", err);
        }
    }

    let stats = pipeline.stats();
    println!("{}", "=".repeat(60));
    println!("📊 Pipeline statistics");
    println!(
        "   processed {}  passed {}  failed {}  with warnings {}",
        stats.processed, stats.passed, stats.errors, stats.warnings
    );
    println!(
        "   average quality {:.1}  success rate {:.1}%",
        stats.average_quality, stats.success_rate
    );

    println!("{}", "=".repeat(60));
    println!("📈 Prometheus scrape output:\n");
    println!("{}", metrics_handle.render());

    Ok(())
}
