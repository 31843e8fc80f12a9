pub static RAYMARCH_WGSL: &str = include_str!("../shaders/raymarch.wgsl");
pub static GRADIENT_WGSL: &str = include_str!("../shaders/gradient.wgsl");
pub static LINES_WGSL: &str = include_str!("../shaders/lines.wgsl");
pub static POST_WGSL: &str = include_str!("../shaders/post.wgsl");
pub static EQUIRECT_WGSL: &str = include_str!("../shaders/equirect.wgsl");
