/// Version string shown by `--version`, including build metadata from `build.rs`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("MC_GIT_SHA"),
    "\nbuilt: ",
    env!("MC_BUILD_TS")
);
