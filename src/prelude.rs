#[doc(no_inline)]
pub use crate::parallel::BatchReader as _;
#[doc(no_inline)]
pub use crate::policy::BufPolicy as _;
#[doc(no_inline)]
pub use crate::session::TaxonomyLookup as _;
