//! Slot grid handler.

use tabled::Tabled;

use parkpro_core::{Controller, RegistrationForm, SlotOption};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Slot")]
    slot: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn row(option: &SlotOption, color: bool) -> SlotRow {
    SlotRow {
        slot: option.slot.to_string(),
        status: if option.available {
            output::accent("Available", color)
        } else {
            output::caution("Taken", color)
        },
    }
}

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let mut form = RegistrationForm::new();
    form.load_slots(controller).await?;

    let options = form.slot_options();
    let color = output::should_color(global.color);
    let out = output::render_list(
        global.output,
        &options,
        |o| row(o, color),
        |o| {
            let state = if o.available { "available" } else { "taken" };
            format!("{} {state}", o.slot)
        },
    )?;
    output::print_output(&out, global.quiet);

    if matches!(global.output, OutputFormat::Table) {
        output::print_output(&form.occupancy_summary(), global.quiet);
    }
    Ok(())
}
