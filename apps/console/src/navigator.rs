//! # Navigator
//!
//! View-lifecycle controller: decides what a navigation shows and issues
//! the loads a view performs when it mounts.
//!
//! ## Navigation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    navigate(route)                                      │
//! │                                                                         │
//! │  Login / Signup ── authenticated? ──► Redirect(dashboard)              │
//! │        │                                                                │
//! │        └── otherwise ───────────────► View(route), no loads            │
//! │                                                                         │
//! │  protected route (new mount, fresh RouteGuard)                          │
//! │        │                                                                │
//! │        ├── on_mount: persisted token, not authenticated?                │
//! │        │       └── validate_token() (once per mount)                    │
//! │        ▼                                                                │
//! │  decide(policy, GuardInput)                                             │
//! │        ├── Render ─────────► run load commands once ─► View(route)      │
//! │        ├── Loading ────────► Loading                                    │
//! │        └── RedirectToLogin ► Redirect(Login)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A load that comes back 401 signs the session out, so the guard is asked
//! again after the loads have run.

use bakery_client::BakeryApi;
use bakery_core::guard::{decide, GuardInput, MountEffect};
use bakery_core::{GuardDecision, LoadCommand, Route, RouteGuard};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::commands::{auth, bill, product};
use crate::error::ApiError;
use crate::state::AppState;

/// What the console shows after a navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", content = "route", rename_all = "snake_case")]
pub enum Screen {
    View(Route),
    Loading,
    Redirect(Route),
}

pub struct Navigator<A> {
    state: AppState<A>,
    guard: RouteGuard,
    current: Option<Route>,
    loaded: bool,
    booted: bool,
    today: Option<NaiveDate>,
}

impl<A: BakeryApi> Navigator<A> {
    pub fn new(state: AppState<A>) -> Self {
        Navigator {
            state,
            guard: RouteGuard::new(),
            current: None,
            loaded: false,
            booted: false,
            today: None,
        }
    }

    /// Pins the date used for date-windowed loads.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn state(&self) -> &AppState<A> {
        &self.state
    }

    pub fn current(&self) -> Option<&Route> {
        self.current.as_ref()
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    fn persisted_token(&self) -> Option<String> {
        self.state.token_store().load().unwrap_or_else(|e| {
            warn!("Could not read persisted token: {}", e);
            None
        })
    }

    /// App start: validates a persisted token once.
    pub async fn boot(&mut self) {
        if std::mem::replace(&mut self.booted, true) {
            return;
        }
        let session = self.state.current_session();
        if session.has_token() && !session.is_authenticated() {
            if let Err(err) = auth::validate_token(&self.state).await {
                debug!(error = %err, "Boot validation failed");
            }
        }
    }

    /// Mounts `route`.
    pub async fn navigate(&mut self, route: Route) -> Screen {
        debug!(route = %route, "navigate");
        self.current = Some(route.clone());
        self.guard = RouteGuard::new();
        self.loaded = false;

        if !route.is_protected() {
            if self.state.current_session().is_authenticated() {
                if let Some(target) = route.authenticated_redirect() {
                    return Screen::Redirect(target);
                }
            }
            return Screen::View(route);
        }

        let session = self.state.current_session();
        let persisted = self.persisted_token();
        if let Some(MountEffect::ValidateToken(_)) =
            self.guard.on_mount(&session, persisted.as_deref())
        {
            if let Err(err) = auth::validate_token(&self.state).await {
                debug!(error = %err, "Mount validation failed");
            }
        }
        self.evaluate(&route).await
    }

    /// Re-renders the current view without remounting it.
    pub async fn refresh(&mut self) -> Option<Screen> {
        let route = self.current.clone()?;
        if !route.is_protected() {
            return Some(self.navigate(route).await);
        }
        let session = self.state.current_session();
        let persisted = self.persisted_token();
        // already mounted: never yields an effect
        let _ = self.guard.on_mount(&session, persisted.as_deref());
        Some(self.evaluate(&route).await)
    }

    fn decision(&self) -> GuardDecision {
        let session = self.state.current_session();
        let input = GuardInput::new(&session, self.state.token_store().is_present());
        decide(self.state.guard_policy(), input)
    }

    async fn evaluate(&mut self, route: &Route) -> Screen {
        match self.decision() {
            GuardDecision::Loading => return Screen::Loading,
            GuardDecision::RedirectToLogin => return Screen::Redirect(Route::Login),
            GuardDecision::Render => {}
        }

        if !std::mem::replace(&mut self.loaded, true) {
            for command in route.load_commands(self.today()) {
                if let Err(err) = self.run(command).await {
                    debug!(error = %err, "Load failed");
                }
            }
            if self.decision() == GuardDecision::RedirectToLogin {
                return Screen::Redirect(Route::Login);
            }
        }
        Screen::View(route.clone())
    }

    async fn run(&self, command: LoadCommand) -> Result<(), ApiError> {
        let state = &self.state;
        match command {
            LoadCommand::FetchInventoryValue => product::fetch_inventory_value(state).await.map(drop),
            LoadCommand::FetchCategoryValues => product::fetch_category_values(state).await.map(drop),
            LoadCommand::FetchDailyIncome(range) => {
                product::fetch_daily_income(state, range).await.map(drop)
            }
            LoadCommand::FetchProducts => product::fetch_products(state).await.map(drop),
            LoadCommand::FetchBills => bill::fetch_bills(state).await.map(drop),
            LoadCommand::FetchBill(id) => bill::fetch_bill(state, &id).await.map(drop),
            LoadCommand::FetchTodayIncome => bill::fetch_today_income(state).await.map(drop),
        }
    }
}
