//! ### Token tables
//!
//! Reproduced from the documented Color/Extended/Disk Extended/Super Extended Color
//! BASIC token set as immutable data, the same `[(u8, &str); N]` array-literal shape the
//! Applesoft tokenizer builds its own `HashMap`s from. Gaps in the documented code space
//! are simply absent from these arrays; a lookup miss is not an error here, it falls
//! through to the caller's sentinel text.

/// Single-byte keyword table, codes `0x80..=0xF8`. `0x81` is the bare `GO` keyword --
/// see the volume module's handling of the adjacent `TO`/`SUB` keywords for why no
/// merged `GOTO`/`GOSUB` token is needed here. `0x80..=0xDD` covers Color BASIC,
/// Extended Color BASIC, and Disk Extended Color BASIC's disk-I/O vocabulary in full;
/// `0xDE..=0xF8` is Super Extended Color BASIC's CoCo-3-only hi-res graphics vocabulary
/// (`WIDTH`, `HSCREEN`, `HPRINT`, `HCOLOR`, `HCLS`, `HPAINT`, `HCIRCLE`, `HLINE`,
/// `HGET`, `HPUT`, `HBUFF`, `HDRAW`, `PALETTE` and similar), which is undocumented in
/// the reference material this table is drawn from and is simply absent here, the same
/// way `FUNCTIONS` below documents its own coverage limit -- a lookup miss in that range
/// falls through to the `<??XX>` sentinel like any other gap.
pub const KEYWORDS: [(u8, &str); 94] = [
    (0x80, "FOR"),
    (0x81, "GO"),
    (0x82, "REM"),
    (0x83, "'"),
    (0x84, "ELSE"),
    (0x85, "IF"),
    (0x86, "DATA"),
    (0x87, "PRINT"),
    (0x88, "ON"),
    (0x89, "INPUT"),
    (0x8A, "END"),
    (0x8B, "NEXT"),
    (0x8C, "DIM"),
    (0x8D, "READ"),
    (0x8E, "LET"),
    (0x8F, "RUN"),
    (0x90, "RESTORE"),
    (0x91, "RETURN"),
    (0x92, "STOP"),
    (0x93, "POKE"),
    (0x94, "CONT"),
    (0x95, "LIST"),
    (0x96, "CLEAR"),
    (0x97, "NEW"),
    (0x98, "CLOAD"),
    (0x99, "CSAVE"),
    (0x9A, "OPEN"),
    (0x9B, "CLOSE"),
    (0x9C, "LLIST"),
    (0x9D, "SET"),
    (0x9E, "RESET"),
    (0x9F, "CLS"),
    (0xA0, "MOTOR"),
    (0xA1, "SOUND"),
    (0xA2, "AUDIO"),
    (0xA3, "EXEC"),
    (0xA4, "SKIPF"),
    (0xA5, "TAB("),
    (0xA6, "TO"),
    (0xA7, "SUB"),
    (0xA8, "FN"),
    (0xA9, "THEN"),
    (0xAA, "NOT"),
    (0xAB, "STEP"),
    (0xAC, "OFF"),
    (0xAD, "+"),
    (0xAE, "-"),
    (0xAF, "*"),
    (0xB0, "/"),
    (0xB1, "^"),
    (0xB2, "AND"),
    (0xB3, "OR"),
    (0xB4, ">"),
    (0xB5, "="),
    (0xB6, "<"),
    (0xB7, "DEL"),
    (0xB8, "EDIT"),
    (0xB9, "TRON"),
    (0xBA, "TROFF"),
    (0xBB, "DEF"),
    (0xBC, "LINE"),
    (0xBD, "PCLS"),
    (0xBE, "PSET"),
    (0xBF, "PRESET"),
    (0xC0, "SCREEN"),
    (0xC1, "PCLEAR"),
    (0xC2, "COLOR"),
    (0xC3, "CIRCLE"),
    (0xC4, "PAINT"),
    (0xC5, "GET"),
    (0xC6, "PUT"),
    (0xC7, "DRAW"),
    (0xC8, "PCOPY"),
    (0xC9, "PMODE"),
    (0xCA, "PLAY"),
    (0xCB, "DLOAD"),
    (0xCC, "RENUM"),
    (0xCD, "FILES"),
    // Disk Extended Color BASIC's disk commands, alphabetical in the ROM's own jump
    // table, immediately following Extended Color BASIC's last token (`FILES`).
    (0xCE, "DSKI$"),
    (0xCF, "DSKO$"),
    (0xD0, "BACKUP"),
    (0xD1, "COPY"),
    (0xD2, "DIR"),
    (0xD3, "DRIVE"),
    (0xD4, "DSKINI"),
    (0xD5, "KILL"),
    (0xD6, "LOAD"),
    (0xD7, "LSET"),
    (0xD8, "MERGE"),
    (0xD9, "RENAME"),
    (0xDA, "RSET"),
    (0xDB, "UNLOAD"),
    (0xDC, "VERIFY"),
    (0xDD, "WRITE#"),
];

/// Two-byte function table, `0xFF` followed by a code in `0x80..=0xAC`. Extended/Disk
/// Extended BASIC only documents functions up through the high `0x9F`s; the remaining
/// codes in the stated `0x80..=0xAC` range are reserved/undocumented and simply absent
/// from this array, falling through to the `<??FFXX>` sentinel like any other gap.
pub const FUNCTIONS: [(u8, &str); 31] = [
    (0x80, "SGN"),
    (0x81, "INT"),
    (0x82, "ABS"),
    (0x83, "POS"),
    (0x84, "RND"),
    (0x85, "SQR"),
    (0x86, "LOG"),
    (0x87, "EXP"),
    (0x88, "SIN"),
    (0x89, "COS"),
    (0x8A, "TAN"),
    (0x8B, "ATN"),
    (0x8C, "PEEK"),
    (0x8D, "LEN"),
    (0x8E, "STR$"),
    (0x8F, "VAL"),
    (0x90, "ASC"),
    (0x91, "CHR$"),
    (0x92, "EOF"),
    (0x93, "JOYSTK"),
    (0x94, "FIX"),
    (0x95, "HEX$"),
    (0x96, "VARPTR"),
    (0x97, "INSTR"),
    (0x98, "TIMER"),
    (0x99, "PPOINT"),
    (0x9A, "STRING$"),
    (0x9B, "USR0"),
    (0x9C, "USR1"),
    (0x9D, "USR2"),
    (0x9E, "USR3"),
];
