pub mod document;
pub mod enums;
pub mod observation;
pub mod person;
pub mod share_pack;

pub use document::*;
pub use enums::*;
pub use observation::*;
pub use person::*;
pub use share_pack::*;
