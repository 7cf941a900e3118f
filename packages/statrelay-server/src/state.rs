use statrelay_sdk::StatsClient;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) client: StatsClient,
}
