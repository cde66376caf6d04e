use anyhow::{Context, Result};
use crossterm::style::Stylize;
use reedline::{
    default_emacs_keybindings, ColumnarMenu, Emacs, FileBackedHistory, KeyCode, KeyModifiers,
    MenuBuilder, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline,
    ReedlineEvent, ReedlineMenu, Signal,
};
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;
use symptom_diag::api::ApiClient;
use symptom_diag::config::Config;
use symptom_diag::state::{Event, Runtime, RuntimeHandle};
use symptom_diag::utils::logging::{get_log_buffer, init_tracing};
use tracing::info;

mod completer;
mod shell_display;

use completer::{CommandCompleter, COMMANDS};
use shell_display::{SharedView, ShellDisplay};

struct DiagPrompt;

impl Prompt for DiagPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed("diag")
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<'_, str> {
        match edit_mode {
            PromptEditMode::Default | PromptEditMode::Emacs => "> ".into(),
            PromptEditMode::Vi(vi_mode) => match vi_mode {
                reedline::PromptViMode::Normal => "N> ".into(),
                reedline::PromptViMode::Insert => "I> ".into(),
            },
            PromptEditMode::Custom(str) => format!("{str}> ").into(),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse search: {})",
            prefix, history_search.term
        ))
    }
}

fn print_help() {
    println!(
        "{}",
        "symptom-diag - Diagnostic automobile par symptômes".blue().bold()
    );
    println!();
    println!("{}", "Usage:".yellow());
    println!("  symptom-diag [OPTIONS]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}   - Use this config file", "--config <path>".green());
    println!(
        "  {} - Print a config file with defaults",
        "--generate-config".green()
    );
    println!("  {}            - Show this help", "--help".green());
    println!();
    println!("{}", "Commands:".yellow());
    println!("  {}     - Search symptoms (3 characters minimum)", "<text>".green());
    for (name, description) in COMMANDS {
        println!("  {} - {}", format!("{name:<14}").green(), description);
    }
    println!("  {}     - Complete commands", "Tab".green());
    println!("  {}  - Exit", "Ctrl+D".green());
    println!();
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    generate_config: bool,
    help: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--generate-config" => parsed.generate_config = true,
            "--help" | "-h" => parsed.help = true,
            other => anyhow::bail!("Unknown argument: {other}"),
        }
    }
    Ok(parsed)
}

#[derive(Debug, PartialEq)]
enum Command {
    Search(String),
    Symptoms,
    Pick(usize),
    Toggle(String),
    Diagnose,
    Reset,
    Close,
    Logs,
    Help,
    Quit,
    Usage(&'static str),
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if !trimmed.starts_with('/') {
        // Untrimmed on purpose: the controller applies its own trimming
        return Command::Search(line.to_string());
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|arg| !arg.is_empty());

    match (name, arg) {
        ("/symptoms", _) => Command::Symptoms,
        ("/pick", Some(arg)) => match arg.parse::<usize>() {
            Ok(number) => Command::Pick(number),
            Err(_) => Command::Usage("/pick <n>"),
        },
        ("/pick", None) => Command::Usage("/pick <n>"),
        ("/toggle", Some(arg)) => Command::Toggle(arg.to_string()),
        ("/toggle", None) => Command::Usage("/toggle <id|n>"),
        ("/diagnose", _) => Command::Diagnose,
        ("/reset", _) => Command::Reset,
        ("/close", _) => Command::Close,
        ("/logs", _) => Command::Logs,
        ("/help", _) => Command::Help,
        ("/quit" | "/exit", _) => Command::Quit,
        (other, _) => Command::Unknown(other.to_string()),
    }
}

fn history_file() -> Option<PathBuf> {
    let dir = dirs::data_local_dir()?.join("symptom-diag");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join("history.txt"))
}

fn print_logs() {
    match get_log_buffer() {
        Some(buffer) if !buffer.is_empty() => {
            for entry in buffer.get_recent(40) {
                println!("{}", entry.format_for_display().dark_grey());
            }
        }
        _ => println!("{}", "No log entries".dark_grey()),
    }
}

/// Blocking prompt loop; returns when the user quits or the runtime stops
fn read_loop(handle: RuntimeHandle, view: SharedView) -> Result<()> {
    let completion_menu = Box::new(
        ColumnarMenu::default()
            .with_name("command_completion")
            .with_columns(1)
            .with_column_width(None)
            .with_column_padding(2),
    );

    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Menu("command_completion".to_string()),
    );

    let mut line_editor = Reedline::create()
        .with_completer(Box::new(CommandCompleter))
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    if let Some(history) = history_file().and_then(|path| FileBackedHistory::with_file(100, path).ok())
    {
        line_editor = line_editor.with_history(Box::new(history));
    }

    let prompt = DiagPrompt;

    loop {
        let buffer = match line_editor.read_line(&prompt)? {
            Signal::Success(buffer) => buffer,
            Signal::CtrlD | Signal::CtrlC => break,
        };

        let event = match parse_command(&buffer) {
            Command::Search(text) => Event::InputChanged(text),
            Command::Pick(number) => match view.visible_id(number) {
                Some(id) => Event::SelectFromSearch(id),
                None => {
                    println!("{}", format!("Pas d'élément n°{number}").yellow());
                    continue;
                }
            },
            Command::Toggle(arg) => Event::Toggle(view.resolve_catalog(&arg)),
            Command::Diagnose => Event::Diagnose,
            Command::Reset => Event::Reset,
            Command::Close => Event::CloseResult,
            Command::Symptoms => {
                view.print_catalog();
                continue;
            }
            Command::Logs => {
                print_logs();
                continue;
            }
            Command::Help => {
                print_help();
                continue;
            }
            Command::Usage(usage) => {
                println!("{}", format!("Usage: {usage}").yellow());
                continue;
            }
            Command::Unknown(name) => {
                println!("{}", format!("Unknown command {name}, try /help").yellow());
                continue;
            }
            Command::Quit => break,
        };

        if !handle.send(event) {
            break;
        }
    }

    println!("\nAu revoir !");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    if args.help {
        print_help();
        return Ok(());
    }

    if args.generate_config {
        print!("{}", Config::create_default_with_comments());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::load_from(path)?.with_env_overrides(),
        None => Config::load()?,
    };

    init_tracing(&config.logging.filter);

    let client = ApiClient::with_timeout(&config.service.base_url, config.service.request_timeout())
        .context("Cannot create HTTP client")?;
    println!(
        "{}",
        format!("Service: {}", config.service.base_url).cyan()
    );
    println!("{}", "Tapez /help pour l'aide".dark_grey());

    let view = SharedView::default();
    let (mut runtime, handle) = Runtime::new(config.controller_settings(), Arc::new(client));
    runtime.subscribe(Box::new(ShellDisplay::new(view.clone())));

    let event_loop = tokio::spawn(runtime.run());
    handle.send(Event::LoadSymptoms);

    let prompt_handle = handle.clone();
    let prompt_result = tokio::task::spawn_blocking(move || read_loop(prompt_handle, view))
        .await
        .context("Prompt thread failed")?;

    handle.shutdown();
    let final_state = event_loop.await.context("Event loop failed")?;
    info!(
        target: "system",
        "Session ended with {} selected symptom(s)",
        final_state.selected_ids().len()
    );

    prompt_result
}
