//! Help and version output.

/// Display the version header.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    log_info!("Circadian lighting scheduler for networked smart bulbs");
    log_end!();
}

/// Display general usage.
pub fn display_help() {
    log_version!();
    log_block_start!("Usage: hueflux [OPTIONS] <COMMAND>");
    log_block_start!("Commands:");
    log_indented!("status, s                      Show today's schedule and current targets");
    log_indented!("simulate, sim <START> <END>    Walk the schedule between two local times");
    log_indented!("plan, p <LIGHTS.json>          Print the commands a cycle would send");
    log_indented!("watch, w <LIGHTS.json>...      Run the scheduling loop against snapshots");
    log_block_start!("Options:");
    log_indented!("-c, --config <PATH>            Use this config file instead of the default");
    log_indented!("-d, --debug                    Enable detailed debug output");
    log_indented!("-l, --log <PATH>               Write log output to a file instead of stdout");
    log_indented!("    --brightness <N>           plan: target brightness (0-254)");
    log_indented!("    --last-brightness <N>      plan: brightness applied last cycle (0-254)");
    log_indented!("    --light-level <N>          watch: ambient light level reading");
    log_indented!("-h, --help                     Print help");
    log_indented!("-V, --version                  Print version");
    log_block_start!("Examples:");
    log_indented!("hueflux simulate \"2024-06-21 00:00:00\" \"2024-06-22 00:00:00\"");
    log_indented!("hueflux plan living-room.json --last-brightness 128");
    log_indented!("hueflux --debug watch upstairs.json downstairs.json");
    log_end!();
}
