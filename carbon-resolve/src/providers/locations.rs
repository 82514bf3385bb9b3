//! Country code → numeric location code table for the secondary provider.

/// ISO-3166 alpha-2 codes and their location codes, sorted by country code.
const LOCATION_CODES: &[(&str, u32)] = &[
    ("AD", 2020), ("AE", 2784), ("AF", 2004), ("AG", 2028), ("AI", 2660), ("AL", 2008),
    ("AM", 2051), ("AO", 2024), ("AR", 2032), ("AS", 2016), ("AT", 2040), ("AU", 2036),
    ("AZ", 2031), ("BA", 2070), ("BB", 2052), ("BD", 2050), ("BE", 2056), ("BF", 2854),
    ("BG", 2100), ("BH", 2048), ("BI", 2108), ("BJ", 2204), ("BM", 2060), ("BN", 2096),
    ("BO", 2068), ("BR", 2076), ("BS", 2044), ("BT", 2064), ("BW", 2072), ("BY", 2112),
    ("BZ", 2084), ("CA", 2124), ("CD", 2180), ("CF", 2140), ("CG", 2178), ("CH", 2756),
    ("CI", 2384), ("CK", 2184), ("CL", 2152), ("CM", 2120), ("CN", 2156), ("CO", 2170),
    ("CR", 2188), ("CV", 2132), ("CY", 2196), ("CZ", 2203), ("DE", 2276), ("DJ", 2262),
    ("DK", 2208), ("DM", 2212), ("DO", 2214), ("DZ", 2012), ("EC", 2218), ("EE", 2233),
    ("EG", 2818), ("ES", 2724), ("ET", 2231), ("FI", 2246), ("FJ", 2242), ("FM", 2583),
    ("FR", 2250), ("GA", 2266), ("GB", 2826), ("GE", 2268), ("GG", 2831), ("GH", 2288),
    ("GI", 2292), ("GL", 2304), ("GM", 2270), ("GP", 2312), ("GR", 2300), ("GT", 2320),
    ("GU", 2316), ("GY", 2328), ("HK", 2344), ("HN", 2340), ("HR", 2191), ("HT", 2332),
    ("HU", 2348), ("ID", 2360), ("IE", 2372), ("IL", 2376), ("IN", 2356), ("IQ", 2368),
    ("IS", 2352), ("IT", 2380), ("JE", 2832), ("JM", 2388), ("JO", 2400), ("JP", 2392),
    ("KE", 2404), ("KG", 2417), ("KH", 2116), ("KI", 2296), ("KR", 2410), ("KW", 2414),
    ("KY", 2136), ("KZ", 2398), ("LA", 2418), ("LB", 2422), ("LI", 2438), ("LK", 2144),
    ("LS", 2426), ("LT", 2440), ("LU", 2442), ("LV", 2428), ("LY", 2434), ("MA", 2504),
    ("MD", 2498), ("ME", 2499), ("MG", 2450), ("MK", 2807), ("ML", 2466), ("MM", 2104),
    ("MN", 2496), ("MO", 2446), ("MS", 2500), ("MT", 2470), ("MU", 2480), ("MV", 2462),
    ("MW", 2454), ("MX", 2484), ("MY", 2458), ("MZ", 2508), ("NA", 2516), ("NE", 2562),
    ("NF", 2574), ("NG", 2566), ("NI", 2558), ("NL", 2528), ("NO", 2578), ("NP", 2524),
    ("NR", 2520), ("NU", 2570), ("NZ", 2554), ("OM", 2512), ("PA", 2591), ("PE", 2604),
    ("PG", 2598), ("PH", 2608), ("PK", 2586), ("PL", 2616), ("PN", 2612), ("PR", 2630),
    ("PS", 2275), ("PT", 2620), ("PY", 2600), ("QA", 2634), ("RO", 2642), ("RS", 2688),
    ("RU", 2643), ("RW", 2646), ("SA", 2682), ("SB", 2090), ("SC", 2690), ("SE", 2752),
    ("SG", 2702), ("SH", 2654), ("SI", 2705), ("SK", 2703), ("SL", 2694), ("SM", 2674),
    ("SN", 2686), ("SO", 2706), ("ST", 2678), ("SV", 2222), ("TD", 2148), ("TG", 2768),
    ("TH", 2764), ("TJ", 2762), ("TK", 2772), ("TL", 2626), ("TM", 2795), ("TN", 2788),
    ("TO", 2776), ("TR", 2792), ("TT", 2780), ("TW", 2158), ("TZ", 2834), ("UA", 2804),
    ("UG", 2800), ("US", 2840), ("UY", 2858), ("UZ", 2860), ("VC", 2670), ("VE", 2862),
    ("VG", 2092), ("VI", 2850), ("VN", 2704), ("VU", 2548), ("WS", 2882), ("ZA", 2710),
    ("ZM", 2894), ("ZW", 2716),
];

/// Numeric location code for an ISO-3166 alpha-2 country code (any case).
pub fn location_code(country: &str) -> Option<u32> {
    let upper = country.trim().to_ascii_uppercase();
    LOCATION_CODES
        .binary_search_by(|(code, _)| (*code).cmp(upper.as_str()))
        .ok()
        .map(|i| LOCATION_CODES[i].1)
}
