//! View State
//!
//! One state object per dashboard page. Each owns its collection, filters,
//! modal flags and (for the overview) the time tracker; nothing is shared
//! between instances.
//!
//! Loading never fails: a fetch or decode error is logged and the view
//! degrades to an empty list.

use crate::analytics::{self, ChartBar, StatCard, TeamMember, Totals, TrafficBar};
use crate::client::{fetch_dashboard, DashboardApi, Endpoint};
use crate::collection::{extract_records, CollectionStore, Discriminator, FilterCriteria, Record};
use crate::models::{AnalyticsPoint, DashboardPayload, Product, ProductDraft, User, UserDraft};
use crate::tracker::TimeTracker;
use thiserror::Error;

/// Form validation errors, raised before a draft reaches the store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Form-level checks on a draft
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for UserDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if !self.email.is_empty() && !self.email.contains('@') {
            return Err(ValidationError::Invalid {
                field: "email",
                reason: format!("'{}' is not an email address", self.email),
            });
        }
        Ok(())
    }
}

impl Validate for ProductDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ValidationError::Invalid {
                field: "price",
                reason: "must be a non-negative amount".to_string(),
            });
        }
        Ok(())
    }
}

/// A searchable, filterable list page (Users, Products)
#[derive(Debug)]
pub struct ListView<R> {
    endpoint: Endpoint,
    loading: bool,
    store: CollectionStore<R>,
    criteria: FilterCriteria,
    add_modal_open: bool,
}

pub type UsersView = ListView<User>;
pub type ProductsView = ListView<Product>;

impl UsersView {
    pub fn users() -> Self {
        Self::new(Endpoint::Users)
    }
}

impl ProductsView {
    pub fn products() -> Self {
        Self::new(Endpoint::Products)
    }
}

impl<R: Record> ListView<R> {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            loading: true,
            store: CollectionStore::new(),
            criteria: FilterCriteria::all(),
            add_modal_open: false,
        }
    }

    /// Fetch and seed; any failure leaves an empty list
    pub async fn load(&mut self, api: &dyn DashboardApi) {
        self.loading = true;
        match api.fetch(self.endpoint).await {
            Ok(payload) => self.store.seed_payload(&payload),
            Err(e) => {
                tracing::error!(endpoint = %self.endpoint, error = %e, "Error fetching records");
                self.store.clear();
            }
        }
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn store(&self) -> &CollectionStore<R> {
        &self.store
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.criteria.search_term = term.into();
    }

    pub fn set_discriminator(&mut self, value: impl Into<Discriminator>) {
        self.criteria.category_or_status = value.into();
    }

    /// Records that pass the current filters
    pub fn visible(&self) -> impl Iterator<Item = &R> + '_ {
        self.store.filter(&self.criteria)
    }

    pub fn open_add_modal(&mut self) {
        self.add_modal_open = true;
    }

    pub fn close_add_modal(&mut self) {
        self.add_modal_open = false;
    }

    pub fn is_add_modal_open(&self) -> bool {
        self.add_modal_open
    }

    pub fn remove(&mut self, id: &str) -> Option<R> {
        self.store.remove(id)
    }
}

impl<R> ListView<R>
where
    R: Record,
    R::Draft: Validate,
{
    /// Validate the form, add locally and close the modal.
    ///
    /// On a validation error the modal stays open and the store is untouched.
    pub fn submit_add(&mut self, draft: R::Draft) -> Result<R, ValidationError> {
        draft.validate()?;
        let record = self.store.add(draft);
        self.add_modal_open = false;
        Ok(record)
    }
}

/// The dashboard home page
#[derive(Debug)]
pub struct OverviewView {
    loading: bool,
    dashboard: Option<DashboardPayload>,
    tracker: TimeTracker,
    meeting_modal_open: bool,
}

impl OverviewView {
    pub fn new() -> Self {
        Self::with_tracker(TimeTracker::new())
    }

    pub fn with_tracker(tracker: TimeTracker) -> Self {
        Self {
            loading: true,
            dashboard: None,
            tracker,
            meeting_modal_open: false,
        }
    }

    pub async fn load(&mut self, api: &dyn DashboardApi) {
        self.loading = true;
        self.dashboard = match fetch_dashboard(api).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::error!(error = %e, "Error fetching dashboard data");
                None
            }
        };
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn dashboard(&self) -> Option<&DashboardPayload> {
        self.dashboard.as_ref()
    }

    pub fn stat_cards(&self) -> Vec<StatCard> {
        self.dashboard
            .as_ref()
            .map(|d| analytics::stat_cards(&d.overview))
            .unwrap_or_default()
    }

    pub fn chart(&self) -> Vec<ChartBar> {
        self.dashboard
            .as_ref()
            .map(|d| analytics::overview_chart(&d.analytics))
            .unwrap_or_default()
    }

    pub fn team(&self) -> Vec<TeamMember<'_>> {
        self.dashboard
            .as_ref()
            .map(|d| analytics::team_preview(&d.users))
            .unwrap_or_default()
    }

    pub fn tracker(&self) -> &TimeTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut TimeTracker {
        &mut self.tracker
    }

    pub fn open_meeting_modal(&mut self) {
        self.meeting_modal_open = true;
    }

    pub fn close_meeting_modal(&mut self) {
        self.meeting_modal_open = false;
    }

    pub fn is_meeting_modal_open(&self) -> bool {
        self.meeting_modal_open
    }
}

impl Default for OverviewView {
    fn default() -> Self {
        Self::new()
    }
}

/// The analytics page
#[derive(Debug, Default)]
pub struct AnalyticsView {
    loaded: bool,
    points: Vec<AnalyticsPoint>,
}

impl AnalyticsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, api: &dyn DashboardApi) {
        self.points = match api.fetch(Endpoint::Analytics).await {
            Ok(payload) => extract_records(&payload, "analytics"),
            Err(e) => {
                tracing::error!(error = %e, "Error fetching analytics");
                Vec::new()
            }
        };
        self.loaded = true;
    }

    pub fn is_loading(&self) -> bool {
        !self.loaded
    }

    pub fn points(&self) -> &[AnalyticsPoint] {
        &self.points
    }

    pub fn totals(&self) -> Totals {
        Totals::from_points(&self.points)
    }

    pub fn chart(&self) -> Vec<TrafficBar> {
        analytics::traffic_chart(&self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::models::SessionUser;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    /// Canned payloads per endpoint; anything missing is a connection failure
    #[derive(Default)]
    struct FakeApi {
        payloads: HashMap<&'static str, Value>,
    }

    impl FakeApi {
        fn with(mut self, endpoint: Endpoint, payload: Value) -> Self {
            self.payloads.insert(endpoint.path(), payload);
            self
        }
    }

    #[async_trait]
    impl DashboardApi for FakeApi {
        async fn login(&self, _email: &str, _password: &str) -> Result<SessionUser, ClientError> {
            Err(ClientError::LoginFailed)
        }

        async fn fetch(&self, endpoint: Endpoint) -> Result<Value, ClientError> {
            self.payloads
                .get(endpoint.path())
                .cloned()
                .ok_or(ClientError::Unavailable)
        }
    }

    fn users_payload() -> Value {
        json!({"users": [
            {"id": "1", "name": "Alpha", "email": "alpha@example.com", "status": "active", "joinDate": "2024-01-02"},
            {"id": "2", "name": "Beta", "email": "beta@example.com", "status": "inactive", "joinDate": "2024-02-03"}
        ]})
    }

    #[tokio::test]
    async fn test_users_view_loads_and_filters() {
        let api = FakeApi::default().with(Endpoint::Users, users_payload());
        let mut view = UsersView::users();
        assert!(view.is_loading());

        view.load(&api).await;
        assert!(!view.is_loading());
        assert_eq!(view.store().len(), 2);

        view.set_search("BETA@");
        let names: Vec<_> = view.visible().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Beta"]);

        view.set_search("");
        view.set_discriminator("active");
        let names: Vec<_> = view.visible().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha"]);

        view.set_discriminator("all");
        assert_eq!(view.visible().count(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_degrades_to_empty() {
        let api = FakeApi::default();
        let mut view = ProductsView::products();
        view.load(&api).await;
        assert!(!view.is_loading());
        assert!(view.store().is_empty());
        assert_eq!(view.visible().count(), 0);
    }

    #[tokio::test]
    async fn test_reload_replaces_local_additions() {
        let api = FakeApi::default().with(Endpoint::Users, users_payload());
        let mut view = UsersView::users();
        view.load(&api).await;

        view.submit_add(UserDraft {
            name: "Gamma".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(view.store().len(), 3);

        // Local additions were never sent, so a fresh load drops them
        view.load(&api).await;
        assert_eq!(view.store().len(), 2);
    }

    #[test]
    fn test_submit_add_validates_first() {
        let mut view = UsersView::users();
        view.open_add_modal();

        let err = view
            .submit_add(UserDraft {
                name: "   ".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("name"));
        assert_eq!(err.to_string(), "name is required");
        assert!(view.store().is_empty());
        assert!(view.is_add_modal_open());

        let user = view
            .submit_add(UserDraft {
                name: "Gamma".to_string(),
                email: "gamma@example.com".to_string(),
                status: "active".to_string(),
            })
            .unwrap();
        assert_eq!(view.store().items()[0], user);
        assert!(!view.is_add_modal_open());
    }

    #[test]
    fn test_product_draft_validation() {
        let draft = ProductDraft {
            name: "Pro".to_string(),
            category: "subscription".to_string(),
            price: -1.0,
        };
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::Invalid { field: "price", .. })
        ));

        let bad_email = UserDraft {
            name: "A".to_string(),
            email: "nope".to_string(),
            status: String::new(),
        };
        assert!(matches!(
            bad_email.validate(),
            Err(ValidationError::Invalid { field: "email", .. })
        ));
    }

    #[tokio::test]
    async fn test_overview_view() {
        let api = FakeApi::default().with(
            Endpoint::Dashboard,
            json!({
                "overview": {"totalUsers": 1500, "activeUsers": 900, "revenue": 12000, "growth": 4},
                "users": [{"id": 1, "name": "Alpha"}],
                "analytics": [{"date": "2024-11-25", "views": 10, "clicks": 2, "conversions": 1}]
            }),
        );

        let mut view = OverviewView::new();
        assert!(view.stat_cards().is_empty());

        view.load(&api).await;
        assert!(!view.is_loading());
        assert_eq!(view.stat_cards()[0].value, "1,500");
        assert_eq!(view.stat_cards()[2].value, "$12k");
        assert_eq!(view.chart().len(), 1);
        assert_eq!(view.team()[0].user.name, "Alpha");

        view.open_meeting_modal();
        assert!(view.is_meeting_modal_open());
        view.close_meeting_modal();
        assert!(!view.is_meeting_modal_open());
    }

    #[tokio::test]
    async fn test_overview_view_without_data() {
        let mut view = OverviewView::new();
        view.load(&FakeApi::default()).await;
        assert!(view.dashboard().is_none());
        assert!(view.chart().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_overview_tears_down_tracker() {
        let mut view = OverviewView::new();
        let watch = view.tracker().subscribe();
        view.tracker_mut().toggle();
        tokio::time::sleep(std::time::Duration::from_millis(1_500)).await;

        drop(view);
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        assert_eq!(watch.current().elapsed_seconds, 1);
        assert!(!watch.current().running);
    }

    #[tokio::test]
    async fn test_analytics_view_accepts_both_shapes() {
        let points = json!([
            {"date": "2024-11-25", "views": 100, "clicks": 10, "conversions": 5},
            {"date": "2024-11-26", "views": 300, "clicks": 30, "conversions": 7}
        ]);

        let mut bare = AnalyticsView::new();
        bare.load(&FakeApi::default().with(Endpoint::Analytics, points.clone()))
            .await;
        assert_eq!(bare.points().len(), 2);

        let mut wrapped = AnalyticsView::new();
        wrapped
            .load(&FakeApi::default().with(Endpoint::Analytics, json!({"analytics": points})))
            .await;
        assert!(!wrapped.is_loading());
        assert_eq!(wrapped.totals().conversions, 12);
        assert_eq!(wrapped.totals().conversion_rate_display(), "3.0%");
        assert_eq!(wrapped.chart()[1].views_height, 100.0);
    }
}
