//! Usage text shown when no complete command is given

use std::path::Path;

/// Usage text for `program` (argv[0]; only its base name is shown)
pub fn usage(program: &str) -> String {
    let name = Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "aliastool".to_string());

    format!(
        "usage:\n \
         Set IP/FQDN entry to the Alias\n     \
         {name} set <alias> <IP/FQDN>\n\
         \n \
         Get IP/FQDN entry from the Alias\n     \
         {name} get <alias>\n\
         \n \
         Set example:\n     \
         {name} set webserver 192.168.1.10\n\
         \n \
         Get example:\n     \
         {name} get webserver\n\
         \n"
    )
}
