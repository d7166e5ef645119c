use std::time::Duration;

use dnabot::{SimClient, StateSnapshot};

use super::RemoteArgs;

#[derive(Clone, Copy, Debug)]
pub(super) enum RemoteAction {
    State,
    Step { ticks: u64 },
    Restart,
}

pub(super) fn run_remote(action: RemoteAction, args: RemoteArgs) -> Result<(), String> {
    let client = SimClient::new(args.url, Duration::from_millis(args.timeout_ms))
        .map_err(|e| format!("http client: {}", e))?;

    let snapshot = match action {
        RemoteAction::State => client.state(),
        RemoteAction::Restart => client.restart(),
        RemoteAction::Step { ticks } => {
            let mut last = client.state().map_err(|e| describe(&client, e))?;
            for _ in 0..ticks {
                last = client.step().map_err(|e| describe(&client, e))?;
                if !args.json {
                    print_summary(&last);
                }
                if last.repair_complete {
                    break;
                }
            }
            Ok(last)
        }
    }
    .map_err(|e| describe(&client, e))?;

    if args.json {
        let out = serde_json::to_string_pretty(&snapshot).map_err(|e| e.to_string())?;
        println!("{}", out);
    } else if !matches!(action, RemoteAction::Step { .. }) {
        print_summary(&snapshot);
    }
    Ok(())
}

fn describe(client: &SimClient, err: reqwest::Error) -> String {
    format!("request to {} failed: {}", client.base_url(), err)
}

fn print_summary(state: &StateSnapshot) {
    println!(
        "steps={} | agent=({}, {}) | mode={} | carrying={} | left={} | discovered={} | reward={:.2}{}",
        state.steps,
        state.agent[0],
        state.agent[1],
        state.mode.label(),
        state.carrying_dna,
        state.mutations_left,
        state.discovered_mutations.len(),
        state.reward,
        if state.repair_complete { " | complete" } else { "" }
    );
}
