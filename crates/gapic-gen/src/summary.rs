//! Plain-text overview of a model, one element per line.

use std::fmt::Write;

use gapic_gen_model::Api;

/// Render the API identity, services with their HTTP bindings, and the
/// generated messages and enums.
pub fn render(api: &Api) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "name:    {}", api.name);
    let _ = writeln!(out, "package: {}", api.package_name);
    if !api.title.is_empty() {
        let _ = writeln!(out, "title:   {}", api.title);
    }

    for service in api.services() {
        let _ = writeln!(out, "\nservice {}", service.id);
        if !service.default_host.is_empty() {
            let _ = writeln!(out, "  host {}", service.default_host);
        }
        for &handle in &service.methods {
            let method = api.method(handle);
            let mut flags = Vec::new();
            if method.deprecated {
                flags.push("deprecated");
            }
            if method.pagination.is_some() {
                flags.push("paginated");
            }
            if method.operation_info.is_some() {
                flags.push("lro");
            }
            if method.client_streaming || method.server_streaming {
                flags.push("streaming");
            }
            let flags = if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            };
            let _ = writeln!(
                out,
                "  rpc {}({}) -> {}{flags}",
                method.name, method.input_type_id, method.output_type_id
            );
            for binding in method.path_info.iter().flat_map(|p| &p.bindings) {
                let _ = writeln!(out, "    {} {}", binding.verb, binding.path_template);
            }
        }
    }

    let messages = api.all_messages();
    if !messages.is_empty() {
        let _ = writeln!(out, "\nmessages ({})", messages.len());
        for handle in messages {
            let message = api.message(handle);
            let _ = writeln!(out, "  {} ({} fields)", message.id, message.fields.len());
        }
    }
    let enums = api.all_enums();
    if !enums.is_empty() {
        let _ = writeln!(out, "\nenums ({})", enums.len());
        for handle in enums {
            let enumeration = api.enum_type(handle);
            let _ = writeln!(out, "  {} ({} values)", enumeration.id, enumeration.values.len());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use gapic_gen_model::{Api, Enum, EnumValue, Field, Message, Method, Service, Typez};

    use super::*;

    #[test]
    fn lists_services_and_types() {
        let mut api = Api {
            name: "library".to_string(),
            package_name: "example.library.v1".to_string(),
            ..Api::default()
        };
        let book = api.add_message(Message {
            name: "Book".to_string(),
            id: ".example.library.v1.Book".to_string(),
            package: "example.library.v1".to_string(),
            fields: vec![Field {
                name: "title".to_string(),
                typez: Typez::String,
                ..Field::default()
            }],
            ..Message::default()
        });
        api.messages.push(book);
        let genre = api.add_enum(Enum {
            id: ".example.library.v1.Genre".to_string(),
            values: vec![EnumValue::default(), EnumValue::default()],
            ..Enum::default()
        });
        api.enums.push(genre);
        let method = api.add_method(Method {
            name: "GetBook".to_string(),
            input_type_id: ".example.library.v1.GetBookRequest".to_string(),
            output_type_id: ".example.library.v1.Book".to_string(),
            deprecated: true,
            ..Method::default()
        });
        let service = api.add_service(Service {
            id: ".example.library.v1.Library".to_string(),
            default_host: "library.example.com".to_string(),
            methods: vec![method],
            ..Service::default()
        });
        api.services.push(service);

        let text = render(&api);
        assert!(text.starts_with("name:    library\npackage: example.library.v1\n"), "{text}");
        assert!(text.contains("service .example.library.v1.Library\n  host library.example.com\n"));
        assert!(text.contains(
            "  rpc GetBook(.example.library.v1.GetBookRequest) -> .example.library.v1.Book [deprecated]\n"
        ));
        assert!(text.contains("messages (1)\n  .example.library.v1.Book (1 fields)\n"));
        assert!(text.contains("enums (1)\n  .example.library.v1.Genre (2 values)\n"));
    }

    #[test]
    fn empty_model_has_no_sections() {
        let text = render(&Api::default());
        assert!(!text.contains("messages"));
        assert!(!text.contains("service"));
        assert!(!text.contains("title"));
    }
}
