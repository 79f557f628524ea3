//! Domain types and models

pub mod auth;
pub mod envelope;
pub mod market;
pub mod portfolio;
pub mod preferences;
pub mod realtime;
pub mod report;

pub use auth::{
    AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
    RefreshTokenRequest, RegisterRequest, ResetPasswordRequest, TokenPair, TokenResponse,
    UpdateProfileRequest, User, UserPreferences,
};
pub use envelope::ApiEnvelope;
pub use market::{
    Alert, AlertCondition, AlertOperator, AlertType, CreateAlertRequest, HistoricalPrice,
    HistoricalQuery, MarketQuote, MoverKind, NewsArticle, SymbolSearchResult, UpdateAlertRequest,
    WatchlistItem,
};
pub use portfolio::{
    Activity, AddAssetRequest, Asset, AssetAllocation, AssetType, BulkAssetUpdate,
    CreatePortfolioRequest, CreateTransactionRequest, Currency, PerformanceData,
    PerformancePeriod, Portfolio, Transaction, TransactionFilter, TransactionType,
    UpdateAssetRequest, UpdatePortfolioRequest, UpdateTransactionRequest,
};
pub use preferences::Theme;
pub use realtime::{ClientFrame, ConnectionState, PriceUpdate, PushEvent, ServerFrame};
pub use report::{ReportJob, ReportRequest, ReportState};
