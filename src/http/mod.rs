pub mod cachetag;
pub mod httpcache;
pub mod multipart;
pub mod orderedheaders;
pub mod pathencoding;
pub mod querystring;
pub mod requestbody;
pub mod response;
pub mod responsebody;
pub mod streamfactory;

// Re-exports for convenience
pub use cachetag::CacheTag;
pub use httpcache::TaggedCache;
pub use multipart::{Form, Part, PartOptions};
pub use orderedheaders::OrderedHeaderMap;
pub use requestbody::RequestBody;
pub use response::{HttpResponse, RawResponse, ResponseValue};
pub use responsebody::{RawBody, ResponseBody};
