//! DOM Element Schema Registry
//!
//! A compact table of native HTML elements and their bindable properties.

use super::dom_security_schema::security_schema;
use super::element_schema_registry::{ElementSchemaRegistry, SecurityContext, ValidationResult};
use crate::ml_parser::tags::{is_ng_container, is_ng_content, is_ng_template};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Element schema encoding inheritance and properties.
///
/// Each line is `element_names^parent|properties`:
/// - names separated by `,` share the same properties;
/// - `^parent` inherits the parent's properties;
/// - property prefixes: `!` boolean, `#` number, `%` object, `*` event;
///   no prefix is a string property.
const SCHEMA: &[&str] = &[
    "[Element]|textContent,%classList,className,id,innerHTML,outerHTML,#scrollLeft,#scrollTop,slot,*copy,*cut,*paste",
    "[HTMLElement]^[Element]|accessKey,contentEditable,dir,!draggable,!hidden,innerText,lang,*blur,*change,*click,*contextmenu,*dblclick,*focus,*input,*keydown,*keypress,*keyup,*load,*mousedown,*mouseenter,*mouseleave,*mousemove,*mouseout,*mouseover,*mouseup,*scroll,*submit,outerText,!spellcheck,%style,#tabIndex,title,!translate",
    "abbr,address,article,aside,b,bdi,bdo,cite,code,dd,dfn,dt,em,figcaption,figure,footer,header,i,kbd,main,mark,nav,noscript,s,samp,section,small,strong,sub,sup,u,var,wbr^[HTMLElement]|",
    "media^[HTMLElement]|!autoplay,!controls,%crossOrigin,#currentTime,!loop,!muted,#playbackRate,preload,src,#volume",
    "a^[HTMLElement]|download,hash,host,hostname,href,hreflang,password,pathname,ping,port,protocol,referrerPolicy,rel,%relList,search,target,text,type,username",
    "area^[HTMLElement]|alt,coords,download,href,ping,referrerPolicy,rel,shape,target",
    "audio^media|",
    "br^[HTMLElement]|clear",
    "base^[HTMLElement]|href,target",
    "body^[HTMLElement]|*beforeunload,*hashchange,*message,*offline,*online,*popstate,*resize,*storage,*unload",
    "button^[HTMLElement]|!disabled,formAction,formEnctype,formMethod,!formNoValidate,formTarget,name,type,value",
    "canvas^[HTMLElement]|#height,#width",
    "div^[HTMLElement]|align",
    "dl^[HTMLElement]|!compact",
    "fieldset^[HTMLElement]|!disabled,name",
    "form^[HTMLElement]|acceptCharset,action,autocomplete,encoding,enctype,method,name,!noValidate,target",
    "h1,h2,h3,h4,h5,h6^[HTMLElement]|align",
    "hr^[HTMLElement]|align,color,!noShade,size,width",
    "iframe^[HTMLElement]|align,allow,!allowFullscreen,height,name,referrerPolicy,%sandbox,src,srcdoc,width",
    "img^[HTMLElement]|align,alt,border,%crossOrigin,decoding,#height,!isMap,loading,referrerPolicy,sizes,src,srcset,useMap,#width",
    "input^[HTMLElement]|accept,align,alt,autocomplete,!checked,!defaultChecked,defaultValue,dirName,!disabled,%files,formAction,formEnctype,formMethod,!formNoValidate,formTarget,#height,!indeterminate,max,#maxLength,min,#minLength,!multiple,name,pattern,placeholder,!readOnly,!required,selectionDirection,#selectionEnd,#selectionStart,#size,src,step,type,value,%valueAsDate,#valueAsNumber,#width",
    "li^[HTMLElement]|type,#value",
    "label^[HTMLElement]|htmlFor",
    "link^[HTMLElement]|as,charset,%crossOrigin,!disabled,href,hreflang,integrity,media,referrerPolicy,rel,%relList,rev,%sizes,type",
    "ol^[HTMLElement]|!compact,!reversed,#start,type",
    "optgroup^[HTMLElement]|!disabled,label",
    "option^[HTMLElement]|!defaultSelected,!disabled,label,!selected,text,value",
    "p^[HTMLElement]|align",
    "pre^[HTMLElement]|#width",
    "q,blockquote^[HTMLElement]|cite",
    "script^[HTMLElement]|!async,charset,%crossOrigin,!defer,integrity,!noModule,src,text,type",
    "select^[HTMLElement]|autocomplete,!disabled,#length,!multiple,name,!required,#selectedIndex,#size,value",
    "slot^[HTMLElement]|name",
    "source^[HTMLElement]|media,sizes,src,srcset,type",
    "span^[HTMLElement]|",
    "style^[HTMLElement]|!disabled,media,type",
    "table^[HTMLElement]|align,bgColor,border,%caption,cellPadding,cellSpacing,frame,rules,summary,%tHead,%tFoot,width",
    "tbody,tfoot,thead^[HTMLElement]|align,ch,chOff,vAlign",
    "td,th^[HTMLElement]|abbr,align,axis,bgColor,ch,chOff,#colSpan,headers,height,!noWrap,#rowSpan,scope,vAlign,width",
    "template^[HTMLElement]|",
    "textarea^[HTMLElement]|autocomplete,#cols,defaultValue,dirName,!disabled,#maxLength,#minLength,name,placeholder,!readOnly,!required,#rows,selectionDirection,#selectionEnd,#selectionStart,value,wrap",
    "title^[HTMLElement]|text",
    "tr^[HTMLElement]|align,bgColor,ch,chOff,vAlign",
    "track^[HTMLElement]|!default,kind,label,src,srclang",
    "ul^[HTMLElement]|!compact,type",
    "unknown^[HTMLElement]|",
    "video^media|#height,poster,#width",
];

/// Map from attribute names to property names
static ATTR_TO_PROP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("class", "className"),
        ("for", "htmlFor"),
        ("formaction", "formAction"),
        ("innerHtml", "innerHTML"),
        ("readonly", "readOnly"),
        ("tabindex", "tabIndex"),
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropertyType {
    Boolean,
    Number,
    String,
    Object,
}

/// DOM Element Schema Registry implementation
#[derive(Debug)]
pub struct DomElementSchemaRegistry {
    schema: HashMap<String, HashMap<String, PropertyType>>,
    // Events are kept apart; binding to an `on*` property is never allowed.
    event_schema: HashMap<String, HashSet<String>>,
}

impl DomElementSchemaRegistry {
    pub fn new() -> Self {
        let mut schema: HashMap<String, HashMap<String, PropertyType>> = HashMap::new();
        let mut event_schema: HashMap<String, HashSet<String>> = HashMap::new();

        for encoded_type in SCHEMA {
            let Some((str_type, str_properties)) = encoded_type.split_once('|') else {
                continue;
            };
            let (type_names, super_name) = match str_type.split_once('^') {
                Some((names, parent)) => (names, Some(parent)),
                None => (str_type, None),
            };

            let mut properties = HashMap::new();
            let mut events = HashSet::new();
            if let Some(super_name) = super_name {
                let super_lower = super_name.to_lowercase();
                if let Some(super_props) = schema.get(&super_lower) {
                    properties.extend(super_props.iter().map(|(k, v)| (k.clone(), *v)));
                }
                if let Some(super_events) = event_schema.get(&super_lower) {
                    events.extend(super_events.iter().cloned());
                }
            }

            for property in str_properties.split(',').filter(|p| !p.is_empty()) {
                let (kind, name) = match property.split_at(1) {
                    ("*", name) => {
                        events.insert(name.to_string());
                        continue;
                    }
                    ("!", name) => (PropertyType::Boolean, name),
                    ("#", name) => (PropertyType::Number, name),
                    ("%", name) => (PropertyType::Object, name),
                    _ => (PropertyType::String, property),
                };
                properties.insert(name.to_string(), kind);
            }

            for tag in type_names.split(',') {
                let tag_lower = tag.to_lowercase();
                schema.insert(tag_lower.clone(), properties.clone());
                event_schema.insert(tag_lower, events.clone());
            }
        }

        DomElementSchemaRegistry { schema, event_schema }
    }

    /// Get all known events of an element
    pub fn all_known_events_of_element(&self, tag_name: &str) -> Vec<String> {
        let mut events: Vec<String> = self
            .event_schema
            .get(&tag_name.to_lowercase())
            .map(|events| events.iter().cloned().collect())
            .unwrap_or_default();
        events.sort();
        events
    }

    fn properties_of(&self, tag_name: &str) -> Option<&HashMap<String, PropertyType>> {
        self.schema
            .get(&tag_name.to_lowercase())
            .or_else(|| self.schema.get("unknown"))
    }

    /// Whether the property is a boolean DOM property
    pub fn is_boolean_property(&self, tag_name: &str, prop_name: &str) -> bool {
        self.properties_of(tag_name)
            .and_then(|props| props.get(prop_name))
            .map_or(false, |kind| *kind == PropertyType::Boolean)
    }
}

impl Default for DomElementSchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementSchemaRegistry for DomElementSchemaRegistry {
    fn has_property(&self, tag_name: &str, prop_name: &str) -> bool {
        if is_ng_container(tag_name) || is_ng_content(tag_name) || is_ng_template(tag_name) {
            return false;
        }
        // Custom elements: the properties are unknown until the element upgrades.
        if tag_name.contains('-') {
            return true;
        }
        self.properties_of(tag_name)
            .map_or(false, |props| props.contains_key(prop_name))
    }

    fn has_element(&self, tag_name: &str) -> bool {
        if tag_name.contains('-') || is_ng_template(tag_name) {
            return true;
        }
        self.schema.contains_key(&tag_name.to_lowercase())
    }

    fn security_context(&self, element_name: &str, prop_name: &str, is_attribute: bool) -> SecurityContext {
        let prop_name = if is_attribute {
            self.get_mapped_prop_name(prop_name)
        } else {
            prop_name.to_string()
        };
        let tag_lower = element_name.to_lowercase();
        let prop_lower = prop_name.to_lowercase();
        let schema = security_schema();

        if let Some(ctx) = schema.get(&format!("{}|{}", tag_lower, prop_lower)) {
            return *ctx;
        }
        schema
            .get(&format!("*|{}", prop_lower))
            .copied()
            .unwrap_or(SecurityContext::None)
    }

    fn get_mapped_prop_name(&self, prop_name: &str) -> String {
        ATTR_TO_PROP.get(prop_name).copied().unwrap_or(prop_name).to_string()
    }

    fn validate_property(&self, name: &str) -> ValidationResult {
        if name.to_lowercase().starts_with("on") {
            ValidationResult::error(format!(
                "Binding to event property '{}' is disallowed for security reasons, please use ({})=...\n\
                 If '{}' is a directive input, make sure the directive is declared for this template.",
                name,
                &name[2..],
                name
            ))
        } else {
            ValidationResult::ok()
        }
    }

    fn validate_attribute(&self, name: &str) -> ValidationResult {
        if name.to_lowercase().starts_with("on") {
            ValidationResult::error(format!(
                "Binding to event attribute '{}' is disallowed for security reasons, please use ({})=...",
                name,
                &name[2..]
            ))
        } else {
            ValidationResult::ok()
        }
    }
}
