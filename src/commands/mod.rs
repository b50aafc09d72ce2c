mod fetch;
pub use fetch::fetch;

mod login;
pub use login::login;

mod principal;
pub use principal::principal;

mod proxy;
pub use proxy::proxy;
