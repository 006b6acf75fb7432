use clap::{Parser, ValueEnum};
use navstack::app::{NavigationResult, NavigatorSettings, TransportFailurePolicy};
use navstack::net::DnsProbe;
use navstack::ui::console::HELP;
use navstack::ui::{render_session, ConsoleAction};
use navstack::NavigationController;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProbeKind {
    /// HEAD request with GET fallback
    Http,
    /// Host name resolution only
    Dns,
}

#[derive(Parser, Debug)]
#[command(name = "navstack")]
#[command(about = "A browser back/forward history simulator")]
struct Args {
    /// Pages or URLs to visit on startup, in order
    targets: Vec<String>,

    /// Reachability probe deadline in milliseconds
    #[arg(long = "timeout-ms", default_value_t = 3000)]
    timeout_ms: u64,

    /// What to do when a site cannot be contacted at all (reject or accept)
    #[arg(long = "transport-failure", default_value_t = TransportFailurePolicy::Reject)]
    transport_failure: TransportFailurePolicy,

    /// How external targets are checked
    #[arg(long = "probe", value_enum, default_value_t = ProbeKind::Http)]
    probe: ProbeKind,

    /// Do not retry with GET when HEAD fails
    #[arg(long = "no-get-fallback", default_value_t = false, action = clap::ArgAction::SetTrue)]
    no_get_fallback: bool,

    /// Exit after visiting the startup targets instead of reading commands
    #[arg(long = "batch", default_value_t = false, action = clap::ArgAction::SetTrue)]
    batch: bool,
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let settings = NavigatorSettings {
        probe_timeout: Duration::from_millis(args.timeout_ms),
        transport_failure: args.transport_failure,
        get_fallback: !args.no_get_fallback,
        ..Default::default()
    };

    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };
    // Validations are spawned onto this runtime
    let _guard = runtime.enter();

    let mut controller = match args.probe {
        ProbeKind::Http => match NavigationController::with_http_probe(&settings) {
            Ok(controller) => controller,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        ProbeKind::Dns => NavigationController::new(&settings, Arc::new(DnsProbe::new())),
    };
    log::info!(
        "Starting with probe={:?}, timeout={:?}, transport_failure={}",
        args.probe,
        settings.probe_timeout,
        settings.transport_failure
    );

    for target in &args.targets {
        run_action(&runtime, &mut controller, ConsoleAction::Navigate(target.clone()));
    }

    if args.batch {
        println!("{}", render_session(&controller.session(), None));
        return;
    }

    println!("{}", HELP);
    println!("{}", render_session(&controller.session(), None));

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error: failed to read input: {}", e);
                std::process::exit(1);
            }
        }

        let Some(action) = ConsoleAction::parse(&line) else {
            continue;
        };
        if !run_action(&runtime, &mut controller, action) {
            break;
        }
    }
}

/// Execute one console action. Returns false when the user asked to quit.
fn run_action(runtime: &Runtime, controller: &mut NavigationController, action: ConsoleAction) -> bool {
    match action {
        ConsoleAction::Navigate(target) => match controller.navigate(&target) {
            Ok(pending) => {
                println!("{}", render_session(&controller.session(), Some(&pending)));
                if let Some(result) = runtime.block_on(controller.settle()) {
                    report(controller, result);
                }
            }
            Err(e) => report(controller, Err(e)),
        },
        ConsoleAction::Back => {
            let result = controller.go_back();
            report(controller, result);
        }
        ConsoleAction::Forward => {
            let result = controller.go_forward();
            report(controller, result);
        }
        ConsoleAction::Clear => {
            controller.clear();
            println!("History cleared");
            println!("{}", render_session(&controller.session(), None));
        }
        ConsoleAction::Show => {
            println!("{}", render_session(&controller.session(), controller.pending_target()));
        }
        ConsoleAction::Help => println!("{}", HELP),
        ConsoleAction::Quit => return false,
    }
    true
}

fn report(controller: &NavigationController, result: NavigationResult) {
    match result {
        Ok(page) => {
            println!("Now on {}", page);
            println!("{}", render_session(&controller.session(), None));
        }
        Err(e) if e.should_bounce() => println!("*bounce* {}", e),
        Err(e) => println!("{}", e),
    }
}
