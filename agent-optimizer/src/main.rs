use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

use agent_optimizer::app::App;
use agent_optimizer::cli::{self, Cli, Commands};
use agent_optimizer::client::HttpBackend;
use agent_optimizer::config::Config;
use agent_optimizer::logging;
use agent_optimizer::ui::ui;
use agent_optimizer_sdk::FlowchartRequest;

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::resolve(&cli.config)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_tui(config),
        Commands::Graph { from, file } => {
            logging::init_stderr()?;
            let graph = cli::load_graph(from, &file)?;
            println!("{}", serde_json::to_string_pretty(&graph)?);
            Ok(())
        }
        Commands::Flowchart { role, goal, points } => {
            logging::init_stderr()?;
            let request = FlowchartRequest::new(role, goal, points);
            let output_dir = config.output_dir.clone();
            let backend = HttpBackend::new(config)?;
            let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
            let path = runtime.block_on(cli::generate_flowchart(&backend, &request, &output_dir))?;
            println!("Saved {}", path.display());
            Ok(())
        }
        Commands::Download { pptx_file } => {
            logging::init_stderr()?;
            let output_dir = config.output_dir.clone();
            let backend = HttpBackend::new(config)?;
            let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
            let path = runtime.block_on(cli::download_deck(&backend, &pptx_file, &output_dir))?;
            println!("Saved {}", path.display());
            Ok(())
        }
    }
}

fn run_tui(config: Config) -> Result<()> {
    logging::init_file(&config.log_file)?;
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        // Pick up finished requests and due prompts
        app.tick();

        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
