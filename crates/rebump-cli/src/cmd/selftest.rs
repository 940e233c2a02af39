use crate::output::print_json;
use rebump_core::duration;
use rebump_core::engine::Engine;
use rebump_core::message::SELF_TEST_SAMPLE;
use rebump_core::types::TargetCommand;

pub fn run(text: Option<&str>, json: bool) -> anyhow::Result<()> {
    let sample = text.unwrap_or(SELF_TEST_SAMPLE);
    let result = Engine::run_self_test(sample);

    if json {
        print_json(&result)?;
    } else {
        for &target in TargetCommand::all() {
            let cooldown = result
                .get(target)
                .map(duration::format_seconds)
                .unwrap_or_else(|| "-".to_string());
            println!("{target}: {cooldown}");
        }
        println!(
            "{}",
            if result.success {
                "Parser self-test passed."
            } else {
                "Parser self-test FAILED."
            }
        );
    }

    if !result.success {
        anyhow::bail!("no cooldowns parsed from sample text");
    }
    Ok(())
}
