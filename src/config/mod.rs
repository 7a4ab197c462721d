//! Configuration module

mod site;

pub use site::FeedConfig;
pub use site::FeedType;
pub use site::FooterConfig;
pub use site::HighlightConfig;
pub use site::NavItem;
pub use site::NavbarConfig;
pub use site::ReportPolicy;
pub use site::SiteConfig;
