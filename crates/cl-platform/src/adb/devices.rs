/// Extract the handles of online devices from `adb devices` output.
///
/// Only entries in the `device` state are returned; `offline`,
/// `unauthorized` and friends are not reachable yet.
pub fn parse_device_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("List of devices") && !line.starts_with('*'))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let handle = fields.next()?;
            match fields.next() {
                Some("device") => Some(handle.to_string()),
                _ => None,
            }
        })
        .collect()
}
