//! Built-in grammar texts for the shipped instruction languages.
//!
//! Pipelines construct from these by default; callers may substitute their
//! own text through `with_grammar` as long as the symbol names the decoders
//! dispatch on are kept.

/// Pipe-framed tables. Every line of a table starts with `|`; frame rows use
/// `+`/`-`/`=`. The first column of every table must be `row_id`.
pub const TRAINING_COMPONENTS_GRAMMAR: &str = r##"
# training components instruction language
<instruction>         ::= { <section> } ;
<section>             ::= <table> | <comment> | <break_block> ;

<table>               ::= <table_header> <header_line> <table_divider_line> { <item_line> } <table_bottom_line> ;
<table_header>        ::= <table_top_line> <line_start> <table_title> <line_ending> ;
<table_title>         ::= <cell> ;
<header_line>         ::= <line_start> { <cell> } <line_ending> ;
<item_line>           ::= <line_start> { <cell> } <line_ending> ;
<table_top_line>      ::= { <frame_char> } <newline> ;
<table_divider_line>  ::= { <frame_char> } <newline> ;
<table_bottom_line>   ::= { <frame_char> } <newline> ;

<line_start>          ::= "|" [ <whitespace> ] ;
<line_ending>         ::= <newline> ;
<cell>                ::= <field> [ <whitespace> ] <div> ;
<div>                 ::= "|" [ <whitespace> ] ;
<field>               ::= { <character> } ;

<comment>             ::= "#" [ <comment_text> ] <newline> ;
<comment_text>        ::= { <literal> } ;
<literal>             ::= <character> | <whitespace> ;
<break_block>         ::= <newline> ;

<whitespace>          ::= " " [ <whitespace> ] ;
<newline>             ::= "\n" ;
<frame_char>          ::= "-" | "+" | "=" ;

<character>           ::= <letter> | <number> | <special> ;
<letter>              ::= "a" | "b" | "c" | "d" | "e" | "f" | "g" | "h" | "i" | "j" | "k" | "l" | "m"
                        | "n" | "o" | "p" | "q" | "r" | "s" | "t" | "u" | "v" | "w" | "x" | "y" | "z"
                        | "A" | "B" | "C" | "D" | "E" | "F" | "G" | "H" | "I" | "J" | "K" | "L" | "M"
                        | "N" | "O" | "P" | "Q" | "R" | "S" | "T" | "U" | "V" | "W" | "X" | "Y" | "Z" ;
<number>              ::= "0" | "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9" ;
<special>             ::= "_" | "=" | "," | "." | "-" | "\"" | "'" | ":" | "/" | "(" | ")" | "[" | "]" | "*" | "@" | "%" | "<" | ">" ;
"##;

/// `SCREEN … ENDSCREEN` rendering layouts: panels, figures (`draw`),
/// events, and `__`-tagged properties.
pub const IINUJI_RENDERINGS_GRAMMAR: &str = r##"
# iinuji renderings instruction language
<instruction>    ::= { <screen> } ;

<screen>         ::= <screen_open> [ <screen_items> ] <screen_close> ;
<screen_open>    ::= "SCREEN" [ <opt_key> ] [ <screen_attrs> ] <line_break> ;
<screen_attrs>   ::= { <screen_attr> } ;
<screen_attr>    ::= <opt_name> | <opt_border> | <opt_line_color> | <opt_text_color> | <opt_back_color> | <opt_tickness> | <kind_tag> ;
<screen_items>   ::= { <screen_item> } ;
<screen_item>    ::= <panel_stmt> | <event_block> | <block_comment> | <blank_line> ;
<screen_close>   ::= [ <ws> ] "ENDSCREEN" [ <line_break> ] ;

<panel_stmt>     ::= <panel_open> [ <panel_items> ] <panel_close> ;
<panel_open>     ::= [ <ws> ] "PANEL" <ws> <panel_name> <ws> <kind_ident> [ <panel_attrs> ] <line_break> ;
<panel_name>     ::= <ident> ;
<panel_attrs>    ::= { <panel_attr> } ;
<panel_attr>     ::= <opt_coords> | <opt_shape> | <opt_z_index> | <opt_scale> | <opt_bind> | <opt_title> | <opt_border> | <opt_line_color> | <opt_text_color> | <opt_back_color> | <opt_tickness> ;
<panel_items>    ::= { <panel_item> } ;
<panel_item>     ::= <figure_stmt> | <block_comment> | <blank_line> ;
<panel_close>    ::= [ <ws> ] "ENDPANEL" [ <line_break> ] ;

<figure_stmt>    ::= [ <ws> ] "draw" <ws> <kind_ident> [ <figure_attrs> ] <line_break> ;
<figure_attrs>   ::= { <figure_attr> } ;
<figure_attr>    ::= <opt_value> | <opt_legend> | <opt_title> | <opt_type> | <opt_triggers> | <opt__capacity> | <opt_line_color> | <opt_text_color> | <opt_back_color> | <opt_tickness> | <figure_arg> ;
<figure_arg>     ::= <ws> <ident> ;

<event_block>    ::= [ <ws> ] "EVENT" [ <event_attrs> ] <line_break> ;
<event_attrs>    ::= { <event_attr> } ;
<event_attr>     ::= <opt_name> | <opt_form> | <opt_triggers> | <event_arg> ;
<event_arg>      ::= <ws> <ident> ;

<opt_key>        ::= <ws> <key_run> ;
<key_run>        ::= { <key_char> } ;
<key_char>       ::= "F" | "+" | <digit> ;
<opt_name>       ::= <ws> "__name" <ws> <ident> ;
<opt_type>       ::= <ws> "__type" <ws> <ident> ;
<opt_coords>     ::= <ws> "at" <ws> <point> ;
<opt_shape>      ::= <ws> <point> ;
<opt_z_index>    ::= <ws> "z" <ws> <uint> ;
<opt_scale>      ::= <ws> "scale" <ws> <decimal> ;
<opt_bind>       ::= <ws> "bind" <ws> <ident> ;
<opt_title>      ::= <ws> "__title" <ws> <bool_word> <ws> <dq_string> ;
<opt_border>     ::= <ws> "__border" <ws> <bool_word> ;
<opt_value>      ::= <ws> "__value" <ws> <dq_string> ;
<opt_legend>     ::= <ws> "__legend" <ws> <bool_word> <ws> <dq_string> ;
<opt_line_color> ::= <ws> "__line_color" <ws> <color> ;
<opt_text_color> ::= <ws> "__text_color" <ws> <color> ;
<opt_back_color> ::= <ws> "__back_color" <ws> <color> ;
<opt_tickness>   ::= <ws> "__tickness" <ws> <decimal> ;
<opt__capacity>  ::= <ws> "__capacity" <ws> <decimal> ;
<opt_triggers>   ::= <ws> "__triggers" <ws> <trigger_list> ;
<trigger_list>   ::= { <trigger_char> } ;
<trigger_char>   ::= <ident_char> | "," ;
<opt_form>       ::= <ws> "__form" <ws> <form_list> ;
<form_list>      ::= { <form_char> } ;
<form_char>      ::= <ident_char> | ":" | "," ;
<kind_tag>       ::= <ws> <ident> ;
<kind_ident>     ::= <ident> ;

<block_comment>  ::= [ <ws> ] "/*" [ <bc_body> ] "*/" [ <line_break> ] ;
<bc_body>        ::= { <bc_char> } ;
<bc_char>        ::= <ident_char> | <ws_char> | <nl> | "," | ":" | "#" | "(" | ")" | "=" ;
<blank_line>     ::= [ <ws> ] <nl> ;
<line_break>     ::= [ <ws> ] <nl> ;

<dq_string>      ::= <quote> [ <dq_body> ] <quote> ;
<quote>          ::= "\"" ;
<dq_body>        ::= { <dq_char> } ;
<dq_char>        ::= <ident_char> | <ws_char> | "," | ":" | ";" | "/" | "(" | ")" | "=" | "*" | "#" | "'" | "!" | "?" | "%" | "&" | "<" | ">" | "[" | "]" | "@" | "\\\"" | "\\\\" ;

<color>          ::= "#" <hex_run> ;
<hex_run>        ::= { <hex_char> } ;
<hex_char>       ::= <digit> | "a" | "b" | "c" | "d" | "e" | "f" | "A" | "B" | "C" | "D" | "E" | "F" ;

<point>          ::= <uint> [ <point_tail> ] ;
<point_tail>     ::= "," <uint> ;
<decimal>        ::= <uint> [ <decimal_tail> ] ;
<decimal_tail>   ::= "." <uint> ;
<uint>           ::= { <digit> } ;
<bool_word>      ::= "true" | "false" | "True" | "False" | "TRUE" | "FALSE" ;

<ident>          ::= { <ident_char> } ;
<ident_char>     ::= <letter> | <digit> | "_" | "." | "-" ;
<ws>             ::= <ws_char> [ <ws> ] ;
<ws_char>        ::= " " | "\t" ;
<nl>             ::= "\n" ;

<letter>         ::= "a" | "b" | "c" | "d" | "e" | "f" | "g" | "h" | "i" | "j" | "k" | "l" | "m"
                   | "n" | "o" | "p" | "q" | "r" | "s" | "t" | "u" | "v" | "w" | "x" | "y" | "z"
                   | "A" | "B" | "C" | "D" | "E" | "F" | "G" | "H" | "I" | "J" | "K" | "L" | "M"
                   | "N" | "O" | "P" | "Q" | "R" | "S" | "T" | "U" | "V" | "W" | "X" | "Y" | "Z" ;
<digit>          ::= "0" | "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9" ;
"##;

/// `CIRCUIT … ENDCIRCUIT` board declarations: instances, hops and invokes.
pub const TSIEMENE_BOARD_GRAMMAR: &str = r##"
# tsiemene board instruction language
<instruction>     ::= { <board_item> } ;
<board_item>      ::= <circuit> | <comment_line> | <blank_line> ;

<circuit>         ::= <circuit_header> [ <circuit_items> ] [ <circuit_invoke> ] <circuit_close> ;
<circuit_header>  ::= "CIRCUIT" <ws> <circuit_name> <line_break> ;
<circuit_name>    ::= <ident> ;
<circuit_items>   ::= { <circuit_item> } ;
<circuit_item>    ::= <instance_decl> | <hop_decl> | <comment_line> | <blank_line> ;
<instance_decl>   ::= [ <ws> ] "INSTANCE" <ws> <instance_alias> <ws> <tsi_type> <line_break> ;
<instance_alias>  ::= <ident> ;
<tsi_type>        ::= <ident> ;
<hop_decl>        ::= [ <ws> ] "HOP" <ws> <endpoint_from> <ws> "->" <ws> <endpoint_to> <line_break> ;
<endpoint_from>   ::= <endpoint> ;
<endpoint_to>     ::= <endpoint> ;
<endpoint>        ::= <ident> "@" <ident> ":" <ident> ;
<circuit_invoke>  ::= [ <ws> ] "INVOKE" <ws> <invoke_name> [ <invoke_args> ] <line_break> ;
<invoke_name>     ::= <ident> ;
<invoke_args>     ::= <ws> <invoke_payload> ;
<invoke_payload>  ::= { <payload_char> } ;
<circuit_close>   ::= "ENDCIRCUIT" [ <line_break> ] ;

<comment_line>    ::= [ <ws> ] "#" [ <comment_text> ] <nl> ;
<comment_text>    ::= { <comment_char> } ;
<comment_char>    ::= <ident_char> | <ws_char> | ":" | "," | "@" | "(" | ")" | "=" | "+" | "/" ;
<blank_line>      ::= [ <ws> ] <nl> ;
<line_break>      ::= [ <ws> ] <nl> ;

<payload_char>    ::= <ident_char> | <ws_char> | "{" | "}" | "\"" | ":" | "," | "[" | "]" | "(" | ")" | "=" | "+" | "/" ;

<ident>           ::= { <ident_char> } ;
<ident_char>      ::= <letter> | <digit> | "_" | "." | "-" ;
<ws>              ::= <ws_char> [ <ws> ] ;
<ws_char>         ::= " " | "\t" ;
<nl>              ::= "\n" ;

<letter>          ::= "a" | "b" | "c" | "d" | "e" | "f" | "g" | "h" | "i" | "j" | "k" | "l" | "m"
                    | "n" | "o" | "p" | "q" | "r" | "s" | "t" | "u" | "v" | "w" | "x" | "y" | "z"
                    | "A" | "B" | "C" | "D" | "E" | "F" | "G" | "H" | "I" | "J" | "K" | "L" | "M"
                    | "N" | "O" | "P" | "Q" | "R" | "S" | "T" | "U" | "V" | "W" | "X" | "Y" | "Z" ;
<digit>           ::= "0" | "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9" ;
"##;
