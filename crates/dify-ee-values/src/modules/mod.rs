//! Base logic of each configuration module
//!
//! Every handler asks the questions its module has always asked, regardless
//! of chart version. Version-dependent additions live in `crate::features`.

mod global;
mod infrastructure;
mod mail;
mod networking;
mod plugins;
mod services;

use wizard_core::ModuleFn;

/// Module names, in the order the 3.x track runs them
pub const GLOBAL: &str = "global";
pub const INFRASTRUCTURE: &str = "infrastructure";
pub const NETWORKING: &str = "networking";
pub const MAIL: &str = "mail";
pub const PLUGINS: &str = "plugins";
pub const SERVICES: &str = "services";

/// Handler of every module
pub fn handlers() -> Vec<(&'static str, ModuleFn)> {
    vec![
        (GLOBAL, global::configure as ModuleFn),
        (INFRASTRUCTURE, infrastructure::configure as ModuleFn),
        (NETWORKING, networking::configure as ModuleFn),
        (MAIL, mail::configure as ModuleFn),
        (PLUGINS, plugins::configure as ModuleFn),
        (SERVICES, services::configure as ModuleFn),
    ]
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::TRACKS;

    #[test]
    fn test_every_track_module_has_a_handler() {
        let handlers = handlers();
        for track in TRACKS {
            for module in track.modules {
                assert!(
                    handlers.iter().any(|(name, _)| name == module),
                    "no handler for {}",
                    module
                );
            }
        }
    }
}
