pub mod proxy;
pub mod remote;
pub mod requests;

pub use proxy::{CredentialStatus, CredentialStatusState, ProxyGateway};
pub use remote::GatewayClient;
pub use requests::{
    GenericRequest, HistoricalRequest, ProviderEndpoint, ProviderRequest, ProxyRequest,
    QuotesRequest, DEFAULT_INTERVAL,
};
