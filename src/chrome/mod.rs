//! chromiumoxide による `BrowserDriver` 実装

mod driver;
mod script;

pub use driver::ChromeDriver;
