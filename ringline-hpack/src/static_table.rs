//! HPACK static table (RFC 7541 Appendix A).

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::table::HeaderField;

/// Number of entries in the static table. Dynamic indices start after it.
pub const STATIC_TABLE_LEN: usize = 61;

static STATIC_TABLE: [(&str, &str); STATIC_TABLE_LEN] = [
    (":authority", ""),                   // 1
    (":method", "GET"),                   // 2
    (":method", "POST"),                  // 3
    (":path", "/"),                       // 4
    (":path", "/index.html"),             // 5
    (":scheme", "http"),                  // 6
    (":scheme", "https"),                 // 7
    (":status", "200"),                   // 8
    (":status", "204"),                   // 9
    (":status", "206"),                   // 10
    (":status", "304"),                   // 11
    (":status", "400"),                   // 12
    (":status", "404"),                   // 13
    (":status", "500"),                   // 14
    ("accept-charset", ""),               // 15
    ("accept-encoding", "gzip, deflate"), // 16
    ("accept-language", ""),              // 17
    ("accept-ranges", ""),                // 18
    ("accept", ""),                       // 19
    ("access-control-allow-origin", ""),  // 20
    ("age", ""),                          // 21
    ("allow", ""),                        // 22
    ("authorization", ""),                // 23
    ("cache-control", ""),                // 24
    ("content-disposition", ""),          // 25
    ("content-encoding", ""),             // 26
    ("content-language", ""),             // 27
    ("content-length", ""),               // 28
    ("content-location", ""),             // 29
    ("content-range", ""),                // 30
    ("content-type", ""),                 // 31
    ("cookie", ""),                       // 32
    ("date", ""),                         // 33
    ("etag", ""),                         // 34
    ("expect", ""),                       // 35
    ("expires", ""),                      // 36
    ("from", ""),                         // 37
    ("host", ""),                         // 38
    ("if-match", ""),                     // 39
    ("if-modified-since", ""),            // 40
    ("if-none-match", ""),                // 41
    ("if-range", ""),                     // 42
    ("if-unmodified-since", ""),          // 43
    ("last-modified", ""),                // 44
    ("link", ""),                         // 45
    ("location", ""),                     // 46
    ("max-forwards", ""),                 // 47
    ("proxy-authenticate", ""),           // 48
    ("proxy-authorization", ""),          // 49
    ("range", ""),                        // 50
    ("referer", ""),                      // 51
    ("refresh", ""),                      // 52
    ("retry-after", ""),                  // 53
    ("server", ""),                       // 54
    ("set-cookie", ""),                   // 55
    ("strict-transport-security", ""),    // 56
    ("transfer-encoding", ""),            // 57
    ("user-agent", ""),                   // 58
    ("vary", ""),                         // 59
    ("via", ""),                          // 60
    ("www-authenticate", ""),             // 61
];

/// Static entries as owned fields, so lookups can hand out `&HeaderField`
/// for both table regions.
pub(crate) fn fields() -> &'static [HeaderField] {
    static FIELDS: OnceLock<Vec<HeaderField>> = OnceLock::new();
    FIELDS.get_or_init(|| {
        STATIC_TABLE
            .iter()
            .map(|&(name, value)| HeaderField::new(name, value))
            .collect()
    })
}

/// Reverse index entry for one header name.
pub(crate) struct StaticName {
    /// Lowest index registered under this name.
    pub(crate) first: usize,
    pub(crate) values: HashMap<&'static str, usize>,
}

/// `name -> (value -> index)` over the static table.
pub(crate) fn reverse_index() -> &'static HashMap<&'static str, StaticName> {
    static INDEX: OnceLock<HashMap<&'static str, StaticName>> = OnceLock::new();
    INDEX.get_or_init(|| {
        let mut index: HashMap<&'static str, StaticName> = HashMap::new();
        for (i, &(name, value)) in STATIC_TABLE.iter().enumerate() {
            let entry = index.entry(name).or_insert_with(|| StaticName {
                first: i + 1,
                values: HashMap::new(),
            });
            entry.values.entry(value).or_insert(i + 1);
        }
        index
    })
}
