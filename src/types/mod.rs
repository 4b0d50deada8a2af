pub mod bar;
pub mod fundamentals;
pub mod signals;
pub mod watchlist;

pub use bar::*;
pub use fundamentals::*;
pub use signals::*;
pub use watchlist::*;
