//! Sample configuration documents.

/// A legacy server document touching every migrated section.
pub const LEGACY_SERVER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<cfLuceeConfiguration version="4.2" hspw="secret">
    <file-system encoding="iso-8859-1" deploy-directory="{lucee-server}/cfclasses/"/>
    <charset template-charset="windows-1252" web-charset="utf-8"/>
    <regional timezone="Europe/Zurich" locale="de_CH" timeserver="pool.ntp.org" use-timeserver="true" default-encoding="latin1"/>
    <scope requesttimeout="0,0,1,0" session-type="cfml"/>
    <application listener-type="mixed" listener-mode="curr2root" cached-within-query="0,0,5,0"
        allow-url-requesttimeout="false" requesttimeout="0,0,0,50" script-protect="all"
        admin-synchronisation="true" cache-directory="{lucee-web}/cache/"/>
    <cache default-object="ram" default-template="ram">
        <connection name="ram" class="lucee.runtime.cache.ram.RamCache" read-only="false" storage="false"/>
        <connection name="session" class="lucee.runtime.cache.ram.RamCache" storage="true"/>
    </cache>
    <cache-handlers>
        <cache-handler id="request" class="lucee.runtime.cache.tag.request.RequestCacheHandler"/>
        <cache-handler id="timespan" class="lucee.runtime.cache.tag.timespan.TimespanCacheHandler"/>
    </cache-handlers>
    <ext-tags>
        <ext-tag name="HelloWorld" class="lucee.cfx.example.HelloWorld" type="java"/>
    </ext-tags>
    <compiler supress-ws-before-arg="true" dot-notation-upper-case="false" full-null-support="false"
        externalize-string-gte="-1"/>
    <mappings>
        <mapping virtual="/lucee-server/" physical="{lucee-server}/context/" archive="" readonly="yes"/>
    </mappings>
</cfLuceeConfiguration>
"#;

/// A legacy document with nothing but its root element.
pub const EMPTY_LEGACY_XML: &str =
    r#"<?xml version="1.0" encoding="UTF-8"?><cfLuceeConfiguration/>"#;

/// Legacy markup that stops in the middle of an element.
pub const CORRUPT_LEGACY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<cfLuceeConfiguration version="4.2">
    <regional timezone="Europe/Zurich"
"#;

/// A small document in the current format.
pub const CURRENT_WEB_JSON: &str = r#"{
  "inspectTemplate": "once",
  "requestTimeout": "0,0,0,50"
}"#;

/// Current-format text that is not valid JSON.
pub const CORRUPT_JSON: &str = r#"{"inspectTemplate": "once", "#;
