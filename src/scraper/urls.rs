use crate::feed::LocalityTask;

/// Canonical display form of a suburb: "BONDI  junction " -> "Bondi Junction".
pub fn display_locality(name: &str) -> String {
    name.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// URL path token for a suburb: "BONDI JUNCTION" -> "Bondi%20Junction".
pub fn format_locality_name(name: &str) -> String {
    urlencoding::encode(&display_locality(name)).into_owned()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub fn first_page_url(base: &str, task: &LocalityTask) -> String {
    format!(
        "{base}/sold/list/state/{region}/postcode/{postcode}/suburb/{suburb}/?type=all&ymin={ymin}&ymax={ymax}&bmin=0&bmax=0&pmin=0&pmax=0&sort=date&kw=",
        base = base.trim_end_matches('/'),
        region = task.region,
        postcode = task.postcode,
        suburb = format_locality_name(&task.locality),
        ymin = task.year_min,
        ymax = task.year_max,
    )
}

/// URL for page 2 onwards; the site uses a path-style filter for these.
pub fn page_url(base: &str, task: &LocalityTask, page: u32) -> String {
    if page <= 1 {
        return first_page_url(base, task);
    }

    format!(
        "{base}/sold/list/p/{page}/state/{region}/postcode/{postcode}/suburb/{suburb}/sort/date/type/all/ymin/{ymin}/ymax/{ymax}/",
        base = base.trim_end_matches('/'),
        region = task.region,
        postcode = task.postcode,
        suburb = format_locality_name(&task.locality),
        ymin = task.year_min,
        ymax = task.year_max,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> LocalityTask {
        LocalityTask {
            region: "NSW".into(),
            postcode: "2022".into(),
            locality: "BONDI JUNCTION".into(),
            year_min: 2024,
            year_max: 2024,
        }
    }

    #[test]
    fn formats_mixed_case_and_spacing() {
        assert_eq!(format_locality_name("BONDI JUNCTION"), "Bondi%20Junction");
        assert_eq!(format_locality_name("  north   sydney "), "North%20Sydney");
        assert_eq!(format_locality_name("mOSMAN"), "Mosman");
    }

    #[test]
    fn empty_name_gives_empty_token() {
        assert_eq!(format_locality_name(""), "");
        assert_eq!(format_locality_name("   "), "");
    }

    #[test]
    fn formatted_token_has_no_spaces_and_is_stable() {
        for name in ["st ives chase", "DEE WHY", "o'connor", "Kings  Cross"] {
            let token = format_locality_name(name);
            assert!(!token.contains(' '), "{token}");

            let display = display_locality(name);
            assert_eq!(display_locality(&display), display);
            assert_eq!(format_locality_name(&display), token);
        }
    }

    #[test]
    fn builds_first_page_url() {
        let url = first_page_url("https://www.getsoldprice.com.au/", &task());
        assert_eq!(
            url,
            "https://www.getsoldprice.com.au/sold/list/state/NSW/postcode/2022/suburb/Bondi%20Junction/?type=all&ymin=2024&ymax=2024&bmin=0&bmax=0&pmin=0&pmax=0&sort=date&kw="
        );
    }

    #[test]
    fn builds_later_page_url() {
        let url = page_url("https://www.getsoldprice.com.au", &task(), 3);
        assert_eq!(
            url,
            "https://www.getsoldprice.com.au/sold/list/p/3/state/NSW/postcode/2022/suburb/Bondi%20Junction/sort/date/type/all/ymin/2024/ymax/2024/"
        );
        assert_eq!(page_url("https://x.test", &task(), 1), first_page_url("https://x.test", &task()));
    }
}
