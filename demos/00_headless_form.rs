use glam::Vec2;
use rfgui_text_input::platform::{HeadlessInput, HeadlessSurface, StaticNode};
use rfgui_text_input::{DisplayItem, TextInput, TextInputConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

const FORM: &str = r##"
placeholder = "Age"
restrict = "0-9"
max_length = 3

[input]
width = "120px"
height = "28px"
padding = "4px 8px"
fontSize = "18px"
textAlign = "right"

[box.default]
fill = "#f4f4f4"
rounded = 4.0

[box.focused]
fill = "#ffffff"
rounded = 4.0
stroke = { width = 2.0, color = "#3366ff" }

[box.disabled]
fill = "#dddddd"
"##;

fn describe(input: &TextInput) {
    for item in input.display_list() {
        match item {
            DisplayItem::Box(graphics) => info!(id = graphics.id(), state = %input.state(), "box"),
            DisplayItem::HitRegion(graphics) => {
                info!(interactive = graphics.interactive, "hit region")
            }
            DisplayItem::Mask(graphics) => info!(commands = graphics.commands().len(), "mask"),
            DisplayItem::Text(text) => info!(
                text = %text.text,
                x = text.position.x,
                y = text.position.y,
                visible = text.visible,
                "surrogate text"
            ),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let config = TextInputConfig::from_toml_str(FORM)?;
    let native = HeadlessInput::single_line();
    let mut input = TextInput::from_config(config, native.clone())?;
    input.on_input(|event| info!(value = %event.value, "input"));
    input.on_focus(|_| info!("focus"));
    input.on_blur(|_| info!("blur"));

    let surface = HeadlessSurface::new(640.0, 480.0);
    let mut node = StaticNode::at(40.0, 60.0);
    input.on_added();
    input.render(&node, &surface);
    describe(&input);

    // The first focus attempt is dropped, the deferred retry lands.
    native.fail_next_focus(1);
    input.pointer_down(Vec2::new(10.0, 10.0));
    native.run_deferred();
    native.type_text("12a3");
    input.render(&node, &surface);
    info!(value = %input.text(), "after typing");

    node = StaticNode {
        world_alpha: 0.5,
        ..StaticNode::at(80.0, 60.0)
    };
    input.render(&node, &surface);
    info!(transform = ?native.style("transform"), opacity = ?native.style("opacity"), "moved");

    input.blur();
    input.set_disabled(true);
    input.render(&node, &surface);
    describe(&input);

    input.destroy();
    Ok(())
}
