use dnabot::{Engine, RunStats, SimConfig, play_episode};

pub(super) fn run_episodes(
    config: SimConfig,
    episodes: u64,
    max_ticks: u64,
    json: bool,
) -> Result<(), String> {
    if episodes == 0 {
        return Err("episodes must be at least 1".into());
    }

    let mut engine = Engine::new(config);
    let mut stats = RunStats::default();
    for episode in 1..=episodes {
        if episode > 1 {
            engine.reset();
        }
        let summary = play_episode(&mut engine, episode, max_ticks);
        if !json {
            println!(
                "Episode {} | steps={} | reward={:.2} | completed={} | left={} | explore={} | discoveries={}",
                summary.episode,
                summary.steps,
                summary.reward,
                summary.completed,
                summary.mutations_left,
                summary.rules.explore_count,
                summary.rules.discoveries
            );
        }
        stats.push(summary);
    }

    if json {
        let out = serde_json::to_string_pretty(&stats).map_err(|e| e.to_string())?;
        println!("{}", out);
    } else {
        println!(
            "Completed {}/{} | mean steps={:.1} | mean reward={:.2}",
            stats.completed(),
            stats.episodes.len(),
            stats.mean_steps(),
            stats.mean_reward()
        );
    }
    Ok(())
}
