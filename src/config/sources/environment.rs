//! Environment source: ACTX__SECTION__FIELD, e.g. ACTX__RESOLVER__ANCESTRY_WALK=false

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("ACTX")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("resolver.editor_keys"),
    )
}
