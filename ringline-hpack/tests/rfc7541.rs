//! RFC 7541 Appendix C header block examples, each decoded as a sequence of
//! blocks sharing one decoder.

use ringline_hpack::{Decoder, HeaderField};

fn hex(s: &str) -> Vec<u8> {
    let digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    digits
        .chunks(2)
        .map(|pair| u8::from_str_radix(std::str::from_utf8(pair).unwrap(), 16).unwrap())
        .collect()
}

fn fields(pairs: &[(&str, &str)]) -> Vec<HeaderField> {
    pairs.iter().map(|&(n, v)| HeaderField::new(n, v)).collect()
}

fn dynamic(decoder: &Decoder) -> Vec<HeaderField> {
    let table = decoder.table();
    (62..=table.len())
        .map(|i| table.get(i).unwrap().clone())
        .collect()
}

const DATE_21: &str = "Mon, 21 Oct 2013 20:13:21 GMT";
const DATE_22: &str = "Mon, 21 Oct 2013 20:13:22 GMT";
const LOCATION: &str = "https://www.example.com";
const COOKIE: &str = "foo=ASDJKHQKBZXOQWEOPIUAXQWEOIU; max-age=3600; version=1";

fn check_requests(decoder: &mut Decoder, blocks: [&str; 3]) {
    let got = decoder.decode_block(&hex(blocks[0])).unwrap();
    assert_eq!(
        got,
        fields(&[
            (":method", "GET"),
            (":scheme", "http"),
            (":path", "/"),
            (":authority", "www.example.com"),
        ])
    );
    assert_eq!(dynamic(decoder), fields(&[(":authority", "www.example.com")]));
    assert_eq!(decoder.table().size(), 57);

    let got = decoder.decode_block(&hex(blocks[1])).unwrap();
    assert_eq!(
        got,
        fields(&[
            (":method", "GET"),
            (":scheme", "http"),
            (":path", "/"),
            (":authority", "www.example.com"),
            ("cache-control", "no-cache"),
        ])
    );
    assert_eq!(
        dynamic(decoder),
        fields(&[
            ("cache-control", "no-cache"),
            (":authority", "www.example.com"),
        ])
    );
    assert_eq!(decoder.table().size(), 110);

    let got = decoder.decode_block(&hex(blocks[2])).unwrap();
    assert_eq!(
        got,
        fields(&[
            (":method", "GET"),
            (":scheme", "https"),
            (":path", "/index.html"),
            (":authority", "www.example.com"),
            ("custom-key", "custom-value"),
        ])
    );
    assert_eq!(
        dynamic(decoder),
        fields(&[
            ("custom-key", "custom-value"),
            ("cache-control", "no-cache"),
            (":authority", "www.example.com"),
        ])
    );
    assert_eq!(decoder.table().size(), 164);
}

fn check_responses(decoder: &mut Decoder, blocks: [&str; 3]) {
    let got = decoder.decode_block(&hex(blocks[0])).unwrap();
    assert_eq!(
        got,
        fields(&[
            (":status", "302"),
            ("cache-control", "private"),
            ("date", DATE_21),
            ("location", LOCATION),
        ])
    );
    assert_eq!(
        dynamic(decoder),
        fields(&[
            ("location", LOCATION),
            ("date", DATE_21),
            ("cache-control", "private"),
            (":status", "302"),
        ])
    );
    assert_eq!(decoder.table().size(), 222);

    // ":status: 302" is evicted to make room for ":status: 307".
    let got = decoder.decode_block(&hex(blocks[1])).unwrap();
    assert_eq!(
        got,
        fields(&[
            (":status", "307"),
            ("cache-control", "private"),
            ("date", DATE_21),
            ("location", LOCATION),
        ])
    );
    assert_eq!(
        dynamic(decoder),
        fields(&[
            (":status", "307"),
            ("location", LOCATION),
            ("date", DATE_21),
            ("cache-control", "private"),
        ])
    );
    assert_eq!(decoder.table().size(), 222);

    let got = decoder.decode_block(&hex(blocks[2])).unwrap();
    assert_eq!(
        got,
        fields(&[
            (":status", "200"),
            ("cache-control", "private"),
            ("date", DATE_22),
            ("location", LOCATION),
            ("content-encoding", "gzip"),
            ("set-cookie", COOKIE),
        ])
    );
    assert_eq!(
        dynamic(decoder),
        fields(&[
            ("set-cookie", COOKIE),
            ("content-encoding", "gzip"),
            ("date", DATE_22),
        ])
    );
    assert_eq!(decoder.table().size(), 215);
}

#[test]
fn c3_requests_without_huffman() {
    let mut decoder = Decoder::new(4096);
    check_requests(
        &mut decoder,
        [
            "8286 8441 0f77 7777 2e65 7861 6d70 6c65 2e63 6f6d",
            "8286 84be 5808 6e6f 2d63 6163 6865",
            "8287 85bf 400a 6375 7374 6f6d 2d6b 6579 0c63 7573 746f 6d2d 7661 6c75 65",
        ],
    );
}

#[test]
fn c4_requests_with_huffman() {
    let mut decoder = Decoder::new(4096);
    check_requests(
        &mut decoder,
        [
            "8286 8441 8cf1 e3c2 e5f2 3a6b a0ab 90f4 ff",
            "8286 84be 5886 a8eb 1064 9cbf",
            "8287 85bf 4088 25a8 49e9 5ba9 7d7f 8925 a849 e95b b8e8 b4bf",
        ],
    );
}

#[test]
fn c5_responses_without_huffman() {
    let mut decoder = Decoder::new(256);
    check_responses(
        &mut decoder,
        [
            "4803 3330 3258 0770 7269 7661 7465 611d 4d6f 6e2c 2032 3120 4f63 7420 \
             3230 3133 2032 303a 3133 3a32 3120 474d 546e 1768 7474 7073 3a2f 2f77 \
             7777 2e65 7861 6d70 6c65 2e63 6f6d",
            "4803 3330 37c1 c0bf",
            "88c1 611d 4d6f 6e2c 2032 3120 4f63 7420 3230 3133 2032 303a 3133 3a32 \
             3220 474d 54c0 5a04 677a 6970 7738 666f 6f3d 4153 444a 4b48 514b 425a \
             584f 5157 454f 5049 5541 5851 5745 4f49 553b 206d 6178 2d61 6765 3d33 \
             3630 303b 2076 6572 7369 6f6e 3d31",
        ],
    );
}

#[test]
fn c6_responses_with_huffman() {
    let mut decoder = Decoder::new(256);
    check_responses(
        &mut decoder,
        [
            "4882 6402 5885 aec3 771a 4b61 96d0 7abe 9410 54d4 44a8 2005 9504 0b81 \
             66e0 82a6 2d1b ff6e 919d 29ad 1718 63c7 8f0b 97c8 e9ae 82ae 43d3",
            "4883 640e ffc1 c0bf",
            "88c1 6196 d07a be94 1054 d444 a820 0595 040b 8166 e084 a62d 1bff c05a \
             839b d9ab 77ad 94e7 821d d7f2 e6c7 b335 dfdf cd5b 3960 d5af 2708 7f36 \
             72c1 ab27 0fb5 291f 9587 3160 65c0 03ed 4ee5 b106 3d50 07",
        ],
    );
}

#[test]
fn c2_4_indexed_field() {
    let mut decoder = Decoder::new(4096);
    let got = decoder.decode_block(&hex("82")).unwrap();
    assert_eq!(got, fields(&[(":method", "GET")]));
    assert_eq!(decoder.table().dynamic_len(), 0);
}

#[test]
fn c2_3_never_indexed_field_is_sensitive() {
    use ringline_hpack::HeaderList;

    let block = hex("1008 7061 7373 776f 7264 0673 6563 7265 74");
    let mut decoder = Decoder::new(4096);
    let mut list = HeaderList::new();
    decoder.decode(&mut block.as_slice(), true, &mut list).unwrap();
    assert_eq!(list.fields(), fields(&[("password", "secret")]).as_slice());
    assert!(list.is_sensitive(0));
    assert_eq!(decoder.table().dynamic_len(), 0);
}
