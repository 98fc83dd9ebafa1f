//! citywatch - browse cities and look up their current weather

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use citywatch::action::Action;
use citywatch::api::{ApiError, CitiesClient, WeatherClient};
use citywatch::components::{
    CityTable, CityTableProps, CityWeather, CityWeatherProps, Component,
};
use citywatch::config::{AppConfig, DEFAULT_DATASET_URL, DEFAULT_WEATHER_URL};
use citywatch::effect::Effect;
use citywatch::reducer::reducer;
use citywatch::route::Route;
use citywatch::state::{AppState, Screen};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend, layout::Rect};
use tracing_subscriber::EnvFilter;
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

const CITIES_TASK: &str = "cities";
const WEATHER_TASK: &str = "weather";

/// Browse a public cities dataset and look up current weather per city
#[derive(Parser, Debug)]
#[command(name = "citywatch")]
#[command(about = "Browse cities with infinite scroll and look up their weather")]
struct Args {
    /// Weather API key
    #[arg(long, env = "WEATHER_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Route to open first: "/" or "/weather/<city>"
    #[arg(long, default_value = "/")]
    open: String,

    /// City dataset search endpoint
    #[arg(long, default_value = DEFAULT_DATASET_URL)]
    dataset_url: String,

    /// Current-weather endpoint
    #[arg(long, default_value = DEFAULT_WEATHER_URL)]
    weather_url: String,

    /// Log file (the terminal is owned by the UI)
    #[arg(long, default_value = "citywatch.log")]
    log_file: PathBuf,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum CityComponentId {
    CityList,
    Weather,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum CityContext {
    List,
    Search,
    Weather,
}

impl EventRoutingState<CityComponentId, CityContext> for AppState {
    fn focused(&self) -> Option<CityComponentId> {
        match self.screen {
            Screen::CityList(_) => Some(CityComponentId::CityList),
            Screen::Weather(_) => Some(CityComponentId::Weather),
        }
    }

    fn modal(&self) -> Option<CityComponentId> {
        None
    }

    fn binding_context(&self, id: CityComponentId) -> CityContext {
        match id {
            CityComponentId::CityList => match self.list() {
                Some(list) if list.search_focused => CityContext::Search,
                _ => CityContext::List,
            },
            CityComponentId::Weather => CityContext::Weather,
        }
    }

    fn default_context(&self) -> CityContext {
        CityContext::List
    }
}

/// HTTP clients the effect handler runs requests with
struct Services {
    cities: CitiesClient,
    weather: WeatherClient,
}

impl Services {
    fn new(config: &AppConfig) -> Result<Self, ApiError> {
        Ok(Self {
            cities: CitiesClient::new(config.dataset.clone())?,
            weather: WeatherClient::new(config.weather.clone())?,
        })
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        api_key,
        open,
        dataset_url,
        weather_url,
        log_file,
        debug: debug_args,
    } = Args::parse();

    init_tracing(&log_file)?;

    let config = match AppConfig::new(&dataset_url, &weather_url, &api_key, &open) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };
    let services = Arc::new(Services::new(&config).map_err(io::Error::other)?);
    tracing::info!(route = %config.initial_route, "starting citywatch");

    let debug = DebugSession::new(debug_args);

    // Export JSON schemas if requested
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let terminal_size = crossterm::terminal::size().unwrap_or((80, 24));
    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(terminal_size))
        })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;

    let (middleware, action_recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(
        &mut terminal,
        &debug,
        store,
        services,
        config.initial_route,
        replay_actions,
    )
    .await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug
        .save_actions(action_recorder.as_ref())
        .map_err(debug_error)?;

    tracing::info!("citywatch exited");
    Ok(())
}

/// Route `tracing` output to `path`, filtered by `RUST_LOG` (default `info`).
fn init_tracing(path: &Path) -> io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

struct CityUi {
    table: CityTable,
    weather: CityWeather,
}

impl CityUi {
    fn new() -> Self {
        Self {
            table: CityTable::new(),
            weather: CityWeather,
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<CityComponentId>,
    ) {
        match &state.screen {
            Screen::CityList(list) => {
                event_ctx.component_areas.remove(&CityComponentId::Weather);
                event_ctx.set_component_area(CityComponentId::CityList, area);
                let props = CityTableProps {
                    list,
                    mount: state.mount,
                    viewport_rows: state.viewport_rows(),
                    is_focused: render_ctx.is_focused(),
                };
                self.table.render(frame, area, props);
            }
            Screen::Weather(screen) => {
                event_ctx.component_areas.remove(&CityComponentId::CityList);
                event_ctx.set_component_area(CityComponentId::Weather, area);
                let props = CityWeatherProps {
                    screen,
                    is_focused: render_ctx.is_focused(),
                };
                self.weather.render(frame, area, props);
            }
        }
    }

    fn handle_list_event(&mut self, event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
        let Screen::CityList(list) = &state.screen else {
            return HandlerResponse::ignored();
        };
        let props = CityTableProps {
            list,
            mount: state.mount,
            viewport_rows: state.viewport_rows(),
            is_focused: true,
        };
        let actions: Vec<_> = self.table.handle_event(event, props).into_iter().collect();
        handled(actions)
    }

    fn handle_weather_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let Screen::Weather(screen) = &state.screen else {
            return HandlerResponse::ignored();
        };
        let props = CityWeatherProps {
            screen,
            is_focused: true,
        };
        let actions: Vec<_> = self.weather.handle_event(event, props).into_iter().collect();
        handled(actions)
    }
}

fn handled(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    services: Arc<Services>,
    initial_route: Route,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(CityUi::new()));
    let mut bus: EventBus<AppState, Action, CityComponentId, CityContext> = EventBus::new();
    let keybindings: Keybindings<CityContext> = Keybindings::new();

    let ui_list = Rc::clone(&ui);
    bus.register(CityComponentId::CityList, move |event, state| {
        ui_list.borrow_mut().handle_list_event(&event.kind, state)
    });

    let ui_weather = Rc::clone(&ui);
    bus.register(CityComponentId::Weather, move |event, state| {
        ui_weather
            .borrow_mut()
            .handle_weather_event(&event.kind, state)
    });

    // The list's viewport depends on terminal height
    bus.register_global(|event, _state| match event.kind {
        EventKind::Resize(width, height) => HandlerResponse {
            actions: vec![Action::UiResize(width, height)],
            consumed: false,
            needs_render: true,
        },
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Navigate(initial_route)),
            Some(Action::Quit),
            |_runtime| {},
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, Arc::clone(&services)),
        )
        .await
}

/// Handle effects by spawning tasks. Starting one screen's fetch cancels the
/// other screen's, so a result never outlives the screen that asked for it.
fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, services: Arc<Services>) {
    match effect {
        Effect::FetchCities { mount, page } => {
            ctx.tasks().cancel(&TaskKey::new(WEATHER_TASK));
            ctx.tasks().spawn(TaskKey::new(CITIES_TASK), async move {
                match services.cities.fetch_page(page).await {
                    Ok(records) => {
                        tracing::info!(page, count = records.len(), "city page loaded");
                        Action::ListDidLoad {
                            mount,
                            page,
                            records,
                        }
                    }
                    Err(e) => {
                        tracing::error!(page, error = %e, "error fetching cities");
                        Action::ListDidError {
                            mount,
                            page,
                            error: e.to_string(),
                        }
                    }
                }
            });
        }
        Effect::FetchWeather { mount, city } => {
            ctx.tasks().cancel(&TaskKey::new(CITIES_TASK));
            ctx.tasks().spawn(TaskKey::new(WEATHER_TASK), async move {
                match services.weather.fetch_current(&city).await {
                    Ok(reading) => {
                        tracing::info!(%city, "weather loaded");
                        Action::WeatherDidLoad { mount, reading }
                    }
                    Err(e) => {
                        tracing::error!(%city, error = %e, "error fetching weather data");
                        Action::WeatherDidError {
                            mount,
                            error: e.to_string(),
                        }
                    }
                }
            });
        }
    }
}
